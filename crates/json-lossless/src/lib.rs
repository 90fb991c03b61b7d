#![doc = include_str!("../README.md")]

mod error;
pub mod green;
mod lexer;
mod parser;
mod syntax;
mod visit;

pub use crate::error::{Error, ErrorCode, Parameter, Severity};
pub use crate::green::{GreenLen, GreenToken, GreenValue};
pub use crate::lexer::Lexer;
pub use crate::parser::Parser;
pub use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
pub use crate::visit::{GreenTokenVisitor, SyntaxTokenVisitor};

/// Parse `source` into a lossless syntax tree, never failing: every problem
/// in the input is reported through [`SyntaxTree::errors`].
pub fn parse(source: &str) -> SyntaxTree {
    Parser::new(source).parse()
}

/// Tokenize `source` into a lazy sequence of [`GreenToken`]s.
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}
