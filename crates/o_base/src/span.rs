//! Source location tracking for error reporting.
//!
//! A [`Span`] represents a contiguous region of source text using byte offsets.
//! Every token and error in the command grammar carries a span, enabling
//! precise error messages that point to the exact location of problems.
//!
//! Spans use byte offsets, not character indices, matching Rust's string
//! slicing semantics: `&source[span.start..span.end]` extracts the spanned text.

/// A byte-offset range in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: usize,
    /// Byte offset past the last character (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a span from byte offsets. No validation is performed.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a span covering from the start of `self` to the end of `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if this span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Extracts a short, single-line snippet of `source` around this span, for
    /// embedding in error messages. Clamps to source bounds and collapses
    /// newlines so the snippet never breaks a one-line error display.
    pub fn snippet(&self, source: &str, context: usize) -> String {
        let start = self.start.min(source.len());
        let end = self.end.min(source.len()).max(start);
        let lo = source[..start]
            .char_indices()
            .rev()
            .nth(context)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let hi = source[end..]
            .char_indices()
            .nth(context)
            .map(|(i, _)| end + i)
            .unwrap_or(source.len());
        source[lo..hi].replace(['\n', '\r'], " ")
    }
}
