//! The normalized AST: immutable tagged nodes with location metadata
//! (spec.md §3). This is the data model shared by the lowering visitor,
//! the filter pipeline, and the converter.

mod location;
mod node;
mod tags;

pub use location::{DefLocation, Location, SendLocation, SimpleLocation, XStrLocation};
pub use node::{s, s_loc, Node, NodeData, NodeId, Value};
pub use tags::Tag;

use crate::interner::IStr;

/// Convenience builders for the handful of node shapes constructed in many
/// places (filters synthesizing replacement nodes, the converter building
/// `kwbegin(...)` wrappers, etc). Mirrors the original's `s(:send, ...)`
/// call sites.
pub fn send(recv: Option<Node>, name: impl Into<IStr>, args: Vec<Node>) -> Node {
    let mut children = vec![Value::from(recv)];
    children.push(Value::Str(name.into()));
    children.extend(args.into_iter().map(Value::Node));
    s(Tag::Send, children)
}

pub fn lvar(name: impl Into<IStr>) -> Node {
    s(Tag::Lvar, vec![Value::Str(name.into())])
}

pub fn lvasgn(name: impl Into<IStr>, value: Option<Node>) -> Node {
    s(Tag::Lvasgn, vec![Value::Str(name.into()), Value::from(value)])
}

pub fn str_lit(value: impl Into<IStr>) -> Node {
    s(Tag::Str, vec![Value::Str(value.into())])
}

pub fn sym_lit(value: impl Into<IStr>) -> Node {
    s(Tag::Sym, vec![Value::Str(value.into())])
}

pub fn int_lit(value: i64) -> Node {
    s(Tag::Int, vec![Value::Int(value)])
}

pub fn nil() -> Node {
    s(Tag::Nil, vec![])
}

pub fn array(items: Vec<Node>) -> Node {
    s(Tag::Array, vec![Value::List(items)])
}

pub fn begin(items: Vec<Node>) -> Node {
    s(Tag::Begin, vec![Value::List(items)])
}

pub fn const_(parent: Option<Node>, name: impl Into<IStr>) -> Node {
    s(Tag::Const, vec![Value::from(parent), Value::Str(name.into())])
}
