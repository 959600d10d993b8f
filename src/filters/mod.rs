//! The filter pipeline: a sequence of whole-tree rewrites that run between
//! lowering and conversion. Each filter sees the fully lowered, comment-free
//! AST and returns a new tree of the same shape family; filters that need to
//! introduce top-level statements (an import, a helper declaration) return
//! them from `prepends()` instead of splicing them in by hand, so the
//! pipeline can hoist and deduplicate them in one place.
//!
//! Filters run in sequence, each seeing the previous filter's output. A
//! filter that doesn't touch a node returns it unchanged; `walk` gives every
//! filter a default pre-order traversal so it only needs to supply the
//! per-node rewrite.

mod component;
mod esnext;
mod functions;

pub use component::ComponentFilter;
pub use esnext::EsnextFilter;
pub use functions::FunctionsFilter;

use crate::ast::{self, Node, Value};
use crate::error::ConvertResult;
use crate::options::ConvertOptions;

/// A single rewrite stage in the pipeline.
pub trait Filter {
    /// Name used in diagnostics and in `include`/`exclude` option lists.
    fn name(&self) -> &'static str;

    /// Rewrite the whole tree. Most filters implement this as
    /// `filters::walk(node, &mut |n| ...)` and only supply the per-node match.
    fn process(&mut self, node: Node) -> ConvertResult<Node>;

    /// Top-level statements this filter wants hoisted to the front of the
    /// program (e.g. an import). Called once after `process` returns.
    fn prepends(&mut self) -> Vec<Node> {
        Vec::new()
    }

    /// Propose a different pipeline order. Called once per filter, in
    /// configuration order, before any `process` runs; `names` is the
    /// pipeline's current name order (reflecting any earlier filter's
    /// proposal). Returning `None` (the default) leaves it unchanged — most
    /// filters have no opinion on where the others run (spec.md §4.3).
    fn reorder(&self, names: &[&'static str]) -> Option<Vec<&'static str>> {
        let _ = names;
        None
    }
}

/// Pre-order rewrite: `f` is applied to a node before its children are
/// visited, and again implicitly to the replacement's children as the
/// recursion continues. A node is only rebuilt via `Node::updated` when one
/// of its descendants actually changed, so subtrees untouched by `f` are
/// shared rather than recloned.
pub fn walk(node: Node, f: &mut impl FnMut(Node) -> ConvertResult<Node>) -> ConvertResult<Node> {
    let node = f(node)?;
    let mut changed = false;
    let mut new_children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        match child {
            Value::Node(n) => {
                let rewritten = walk(n.clone(), f)?;
                changed |= rewritten.id() != n.id();
                new_children.push(Value::Node(rewritten));
            }
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let rewritten = walk(item.clone(), f)?;
                    changed |= rewritten.id() != item.id();
                    out.push(rewritten);
                }
                new_children.push(Value::List(out));
            }
            other => new_children.push(other.clone()),
        }
    }
    if changed {
        Ok(node.updated(None, Some(new_children)))
    } else {
        Ok(node)
    }
}

/// The ordered set of filters to run for a given option set, plus the glue
/// that hoists and dedupes their prepends.
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl Pipeline {
    /// Builds the pipeline, applying each filter's `reorder` hook (if any)
    /// in configuration order before composition.
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        let mut order: Vec<&'static str> = filters.iter().map(|f| f.name()).collect();
        for filter in &filters {
            if let Some(proposed) = filter.reorder(&order) {
                order = proposed;
            }
        }
        let mut by_name: rustc_hash::FxHashMap<&'static str, Box<dyn Filter>> = filters
            .into_iter()
            .map(|f| (f.name(), f))
            .collect();
        let filters = order
            .into_iter()
            .filter_map(|name| by_name.remove(name))
            .collect();
        Self { filters }
    }

    /// `esnext` always runs (it is a no-op wherever the target already
    /// supports the modern form); `component` and `functions` are opt-in,
    /// named filters requested through `ConvertOptions::filters`.
    pub fn for_options(opts: &ConvertOptions) -> Self {
        let mut filters: Vec<Box<dyn Filter>> = vec![Box::new(EsnextFilter::new(opts.clone()))];
        for name in &opts.filters {
            match name.as_str() {
                "functions" => filters.push(Box::new(FunctionsFilter)),
                "component" => filters.push(Box::new(ComponentFilter)),
                "esnext" => {}
                other => tracing::warn!(filter = other, "unknown filter name, ignoring"),
            }
        }
        Self::new(filters)
    }

    /// Rewrites `root` through every configured filter in order. Callers
    /// must recompute the comment map against the returned tree before using
    /// it — filters mint fresh node ids for anything they touch, so the
    /// pre-pipeline map no longer matches (spec.md §4.3).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(mut self, root: Node, _opts: &ConvertOptions) -> ConvertResult<Node> {
        let mut current = root;
        for filter in &mut self.filters {
            tracing::debug!(filter = filter.name(), "running filter");
            current = filter.process(current)?;
            let prepends = filter.prepends();
            if !prepends.is_empty() {
                current = prepend_to_program(current, prepends);
            }
        }
        Ok(current)
    }
}

fn prepend_to_program(root: Node, prepends: Vec<Node>) -> Node {
    let mut seen = std::collections::HashSet::new();
    let mut dedup = Vec::new();
    for node in prepends {
        let key = format!("{:?}", (node.kind(), node.children()));
        if seen.insert(key) {
            dedup.push(node);
        }
    }
    let mut statements = if root.kind() == ast::Tag::Begin {
        root.child(0)
            .and_then(Value::as_list)
            .map(<[Node]>::to_vec)
            .unwrap_or_else(|| vec![root.clone()])
    } else {
        vec![root.clone()]
    };
    dedup.append(&mut statements);
    ast::begin(dedup)
}
