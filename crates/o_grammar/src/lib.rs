//! Hand-rolled recursive-descent parser for the command grammar.
//!
//! Grounded in `logicaffeine_language`'s lexer/parser split: a single-pass
//! character scanner with no separate token stream, producing
//! `o_data::Command` directly, with no parser-combinator or
//! grammar-generator crate in between.

mod parser;

pub use o_base::ParseError;
pub use parser::parse;
