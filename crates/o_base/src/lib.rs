//! Pure structural atoms shared across the runtime: source spans and
//! span-carrying errors. No knowledge of the command grammar, the world
//! model, or I/O lives here.

mod error;
mod span;

pub use error::{ParseError, Result, SpannedError};
pub use span::Span;
