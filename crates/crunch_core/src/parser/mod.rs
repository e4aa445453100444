//! JavaScript front end: scanner, recursive-descent parser, AST, traversal,
//! and scope analysis.
//!
//! The pipeline is [`scanner::Lexer`] → [`Parser`] → [`ast`] nodes, with
//! [`visitor::Visit`] and [`scope::analyze`] operating on the result. Parsing
//! is resilient: the output is always a program plus a list of
//! [`crate::error::Diagnostic`]s, never an early abort.

pub mod ast;
pub mod scanner;
pub mod scope;
pub mod visitor;

#[allow(clippy::module_inception)]
mod parser;

pub use parser::{ParseResult, Parser};
