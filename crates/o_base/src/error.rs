//! Error types with source location tracking.
//!
//! Errors in the command grammar carry a [`Span`] indicating where in the
//! source text the problem occurred, plus a rendered `position`/`snippet`
//! pair for the public parser contract (`spec.md` §4.1/§7).

use crate::span::Span;
use std::fmt;

/// An error annotated with its source location.
///
/// The display format is `{message} at {start}..{end}`.
#[derive(Debug, Clone)]
pub struct SpannedError {
    pub message: String,
    pub span: Span,
}

impl SpannedError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Renders this error against its originating source text as the public
    /// `ParseError { message, position, snippet }` shape.
    pub fn into_parse_error(self, source: &str) -> ParseError {
        let snippet = self.span.snippet(source, 12);
        ParseError {
            message: self.message,
            position: self.span.start,
            snippet,
        }
    }
}

impl fmt::Display for SpannedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for SpannedError {}

/// Alias for `std::result::Result<T, SpannedError>`.
pub type Result<T> = std::result::Result<T, SpannedError>;

/// The public error shape for `o_grammar::parse`: `{message, position, snippet}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    pub snippet: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {} (near \"{}\")", self.message, self.position, self.snippet)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanned_error_display() {
        let err = SpannedError::new("test error", Span::new(5, 10));
        let display = format!("{}", err);
        assert!(display.contains("test error"));
        assert!(display.contains("5..10"));
    }

    #[test]
    fn into_parse_error_renders_position_and_snippet() {
        let source = "\\say @bob hello";
        let err = SpannedError::new("unterminated command", Span::new(5, 9));
        let parse_err = err.into_parse_error(source);
        assert_eq!(parse_err.position, 5);
        assert!(parse_err.snippet.contains("@bob"));
    }
}
