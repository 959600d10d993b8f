//! Associates raw comments from the parser with the AST nodes they
//! document (spec.md §4.2).
//!
//! A comment attaches to the nearest node whose range starts at or after
//! the comment's end, walking up to the smallest enclosing node when no
//! node starts exactly there. Keyed by [`NodeId`] rather than node
//! identity via pointer so that an unrelated node reusing a dropped
//! allocation's address can never collide with a stale comment.

use crate::ast::{Node, NodeId};
use crate::lowering::RawComment;
use rustc_hash::FxHashMap;
use text_size::TextRange;

#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    leading: FxHashMap<NodeId, Vec<String>>,
}

impl CommentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leading_for(&self, node: &Node) -> &[String] {
        self.leading.get(&node.id()).map(Vec::as_slice).unwrap_or(&[])
    }

    fn attach(&mut self, id: NodeId, text: String) {
        self.leading.entry(id).or_default().push(text);
    }
}

/// Walks `root` collecting, for every node, the smallest range that starts
/// at or after each comment's end offset. Ties (multiple nodes starting at
/// the same offset) resolve to the most deeply nested one, since visiting
/// proceeds top-down and later (smaller) matches overwrite earlier ones.
///
/// A comment whose candidate offset is `0` is not a special case: spec.md
/// §9 resolves the ambiguity over whether the file's very first node should
/// be eligible by including it like any other offset.
pub fn associate_comments(root: &Node, comments: &[RawComment]) -> CommentMap {
    let mut map = CommentMap::new();
    for comment in comments {
        if let Some((id, _range)) = find_best_target(root, comment.range) {
            map.attach(id, comment.text.clone());
        }
    }
    map
}

/// Finds the node with the smallest range whose start is `>= after.end()`.
fn find_best_target(root: &Node, after: TextRange) -> Option<(NodeId, TextRange)> {
    let mut best: Option<(NodeId, TextRange)> = None;
    walk(root, after, &mut best);
    best
}

fn walk(node: &Node, after: TextRange, best: &mut Option<(NodeId, TextRange)>) {
    if let Some(loc) = node.loc() {
        let range = loc.range();
        if range.start() >= after.end() {
            let better = match best {
                Some((_, b)) => (range.end() - range.start()) < (b.end() - b.start()),
                None => true,
            };
            if better {
                *best = Some((node.id(), range));
            }
        }
    }
    for child in node.children() {
        if let Some(n) = child.as_node() {
            walk(n, after, best);
        }
        if let Some(list) = child.as_list() {
            for n in list {
                walk(n, after, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, Tag, Value};
    use crate::ast::Location;
    use text_size::TextSize;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn attaches_to_the_nearest_following_node() {
        let inner = ast::s_loc(Tag::Int, vec![Value::Int(1)], Location::simple(range(10, 11)));
        let root = ast::s_loc(Tag::Begin, vec![Value::List(vec![inner.clone()])], Location::simple(range(0, 11)));
        let comments = vec![RawComment {
            text: "# one".to_string(),
            range: range(0, 5),
        }];
        let map = associate_comments(&root, &comments);
        assert_eq!(map.leading_for(&inner), ["# one".to_string()]);
    }

    #[test]
    fn offset_zero_candidates_are_eligible() {
        let inner = ast::s_loc(Tag::Int, vec![Value::Int(1)], Location::simple(range(0, 1)));
        let comments = vec![RawComment {
            text: "# lead".to_string(),
            range: range(0, 0),
        }];
        let map = associate_comments(&inner, &comments);
        assert_eq!(map.leading_for(&inner), ["# lead".to_string()]);
    }
}
