/*!
# Rust Language Module

This Rust module provides lexical analysis, parsing and program
ordering (linking) of line-numbered BASIC.

*/

#[macro_use]
mod error;
mod ident;
mod lex;
mod link;
mod parse;

pub mod ast;
pub mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use ident::DataType;
pub use ident::Ident;
pub use lex::lex;
pub use link::link;
pub use parse::parse;

/// One-based line of the source text.
pub type SourceLine = usize;

/// The leading number of a BASIC line; the unit of jump targeting.
pub type StatementNumber = u16;
