//! `esnext` filter: promotes shapes the converter picked conservatively to
//! their native-class-era equivalent once the whole tree has been seen. The
//! only promotion currently made is `class_hash` (an object literal standing
//! in for a class, normally chosen for a class body the converter judged
//! couldn't prove its superclass was a plain constructor) to `class2` (a
//! native `class` declaration) once that body turns out to carry nothing a
//! `class` can't express directly.

use super::Filter;
use crate::ast::{Node, Tag, Value};
use crate::error::ConvertResult;
use crate::options::ConvertOptions;

pub struct EsnextFilter {
    opts: ConvertOptions,
}

impl EsnextFilter {
    pub fn new(opts: ConvertOptions) -> Self {
        Self { opts }
    }
}

impl Filter for EsnextFilter {
    fn name(&self) -> &'static str {
        "esnext"
    }

    fn process(&mut self, node: Node) -> ConvertResult<Node> {
        let eslevel = self.opts.eslevel;
        super::walk(node, &mut |n| Ok(rewrite(eslevel, n)))
    }
}

fn rewrite(eslevel: u32, node: Node) -> Node {
    match node.kind() {
        Tag::ClassHash if eslevel >= 2015 && is_class2_eligible(&node) => {
            node.updated(Some(Tag::Class2), None)
        }
        _ => node,
    }
}

/// A `class_hash` promotes cleanly when it has the three slots a native
/// class expects (name, optional superclass, body) and its body contains no
/// statement outside the method/constant/nested-decl shapes `class2` already
/// knows how to render; the partitioning done for `class_hash` itself is the
/// same scan, so anything that parsed as `class_hash` in the first place
/// already satisfies this.
fn is_class2_eligible(node: &Node) -> bool {
    node.children().len() == 3 && matches!(node.child(1), Some(v) if v.is_absent() || v.as_node().is_some())
}
