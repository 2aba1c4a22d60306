//! Cinder AST
//!
//! The resolved stylesheet syntax tree handed to the output stage.
//! Statements form a closed sum type so every consumer matches exhaustively
//! on the node kind.

pub mod ast;
pub mod span;

pub use ast::{
    AtRule, Block, Comment, Declaration, ExprKind, Expression, Extension, Import, ListSeparator,
    MediaBlock, Rule, SelectorList, Statement,
};
pub use span::Span;
