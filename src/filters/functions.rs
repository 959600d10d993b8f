//! `functions` filter: tail-call elision for `lambda`/`proc` blocks. A block
//! whose body ends in an explicit `return` only needs that `return` because
//! Ruby requires one to exit a `lambda` early from a nested position; in the
//! tail position of the block itself the value is already the block's
//! result, so the explicit `return` is dropped before conversion rather than
//! rendered as a JS `return` wrapped in an IIFE.

use super::Filter;
use crate::ast::{self, Node, Tag, Value};
use crate::error::ConvertResult;

pub struct FunctionsFilter;

impl Filter for FunctionsFilter {
    fn name(&self) -> &'static str {
        "functions"
    }

    fn process(&mut self, node: Node) -> ConvertResult<Node> {
        super::walk(node, &mut |n| Ok(rewrite(n)))
    }
}

fn rewrite(node: Node) -> Node {
    match node.kind() {
        Tag::Block | Tag::Numblock => {
            let call = node.child_node(0);
            if !call.is_some_and(is_lambda_or_proc_call) {
                return node;
            }
            let name_and_args = vec![node.child(0).cloned().unwrap(), node.child(1).cloned().unwrap()];
            match node.child_node(2) {
                Some(body) => {
                    let stripped = strip_tail_return(body);
                    let mut children = name_and_args;
                    children.push(Value::Node(stripped));
                    node.updated(None, Some(children))
                }
                None => node,
            }
        }
        _ => node,
    }
}

fn is_lambda_or_proc_call(call: &Node) -> bool {
    call.kind() == Tag::Send
        && call.child(0).is_some_and(Value::is_absent)
        && matches!(call.child(1).and_then(Value::as_str), Some("lambda") | Some("proc"))
}

/// Rewrites a tail `return expr` (possibly nested at the end of a `begin`)
/// into plain `expr`. Does not descend into `if`/`case` branches: a `return`
/// there is still reachable from a non-tail path and must stay explicit.
fn strip_tail_return(body: &Node) -> Node {
    match body.kind() {
        Tag::Return => {
            let args = body.child(0).and_then(Value::as_list).map(<[Node]>::to_vec).unwrap_or_default();
            args.into_iter().next().unwrap_or_else(ast::nil)
        }
        Tag::Begin => {
            let mut items = body.child(0).and_then(Value::as_list).map(<[Node]>::to_vec).unwrap_or_default();
            match items.pop() {
                Some(last) => {
                    items.push(strip_tail_return(&last));
                    ast::begin(items)
                }
                None => body.clone(),
            }
        }
        _ => body.clone(),
    }
}
