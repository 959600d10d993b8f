//! `component` filter: a worked example of rewriting class bodies that
//! extend a framework component base. Detects a class whose superclass name
//! ends in `Component`, renames a `view_template`/`template` method to
//! `render`, and turns the instance-variable reads inside that method into
//! plain parameters of the same name — the method's call sites move from
//! reading `self` state to taking the same values positionally.

use std::collections::BTreeSet;

use super::Filter;
use crate::ast::{self, Node, Tag, Value};
use crate::error::ConvertResult;
use crate::interner::IStr;

#[derive(Default)]
pub struct ComponentFilter;

impl Filter for ComponentFilter {
    fn name(&self) -> &'static str {
        "component"
    }

    fn process(&mut self, node: Node) -> ConvertResult<Node> {
        super::walk(node, &mut |n| Ok(rewrite(n)))
    }
}

fn rewrite(node: Node) -> Node {
    match node.kind() {
        Tag::Class | Tag::Class2 if extends_component_base(&node) => {
            let name = node.child(0).cloned().unwrap();
            let superclass = node.child(1).cloned().unwrap();
            let body = node
                .child_node(2)
                .cloned()
                .unwrap_or_else(|| ast::begin(vec![]));
            node.updated(None, Some(vec![name, superclass, Value::Node(rewrite_body(&body))]))
        }
        _ => node,
    }
}

fn extends_component_base(node: &Node) -> bool {
    node.child(1)
        .and_then(Value::as_node)
        .and_then(|sup| sup.child(1).and_then(Value::as_str))
        .is_some_and(|n| n.ends_with("Component"))
}

fn rewrite_body(body: &Node) -> Node {
    let stmts = match body.kind() {
        Tag::Begin => body
            .child(0)
            .and_then(Value::as_list)
            .map(<[Node]>::to_vec)
            .unwrap_or_default(),
        _ => vec![body.clone()],
    };
    ast::begin(stmts.into_iter().map(rewrite_member).collect())
}

fn rewrite_member(stmt: Node) -> Node {
    if stmt.kind() != Tag::Def {
        return stmt;
    }
    let name = stmt.child(0).and_then(Value::as_str).unwrap_or("");
    if name != "view_template" && name != "template" {
        return stmt;
    }
    let Some(raw_body) = stmt.child_node(2) else {
        return stmt;
    };

    let mut props = BTreeSet::new();
    collect_ivars(raw_body, &mut props);
    let new_body = ivars_to_lvars(raw_body);
    let params: Vec<Node> = props
        .into_iter()
        .map(|p| ast::s(Tag::Arg, vec![Value::Str(p)]))
        .collect();

    ast::s(
        Tag::Def,
        vec![
            Value::Str(IStr::from("render")),
            Value::List(params),
            Value::Node(new_body),
        ],
    )
}

fn collect_ivars(node: &Node, out: &mut BTreeSet<IStr>) {
    if node.kind() == Tag::Ivar {
        if let Some(name) = node.child(0).and_then(Value::as_str) {
            out.insert(IStr::from(name));
        }
    }
    for child in node.children() {
        match child {
            Value::Node(n) => collect_ivars(n, out),
            Value::List(items) => items.iter().for_each(|n| collect_ivars(n, out)),
            _ => {}
        }
    }
}

fn ivars_to_lvars(node: &Node) -> Node {
    if node.kind() == Tag::Ivar {
        return node.updated(Some(Tag::Lvar), None);
    }
    let mut changed = false;
    let mut new_children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        match child {
            Value::Node(n) => {
                let rewritten = ivars_to_lvars(n);
                changed |= rewritten.id() != n.id();
                new_children.push(Value::Node(rewritten));
            }
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let rewritten = ivars_to_lvars(item);
                    changed |= rewritten.id() != item.id();
                    out.push(rewritten);
                }
                new_children.push(Value::List(out));
            }
            other => new_children.push(other.clone()),
        }
    }
    if changed {
        node.updated(None, Some(new_children))
    } else {
        node.clone()
    }
}
