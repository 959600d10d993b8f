//! Lowering: turns a parser concrete tree into the normalized AST.
//! [`parse_tree`] models the external parser's contract; [`visitor`] does
//! the actual tree walk.

pub mod parse_tree;
pub mod visitor;

pub use parse_tree::{ParseNode, ParseResult, ParserTree, RawComment};
pub use visitor::{Lowering, LoweringOptions};
