//! Byte ranges over a source string.

use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into a source string.
///
/// Tokens carry a `Span`; anything that needs line and column information
/// resolves it through a [`crate::LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets, as produced by `str` indexing.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The start offset as a `usize`.
    #[inline]
    pub fn start_usize(&self) -> usize {
        u32::from(self.start) as usize
    }

    /// The end offset as a `usize`.
    #[inline]
    pub fn end_usize(&self) -> usize {
        u32::from(self.end) as usize
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// Returns the text this span covers in `source`.
    ///
    /// Out-of-range spans yield an empty string rather than panicking.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start_usize()..self.end_usize()).unwrap_or("")
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_offsets() {
        let span = Span::from_offsets(3, 7);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.len(), TextSize::from(4));
        assert_eq!(span.end_usize(), 7);
    }

    #[test]
    fn test_span_empty() {
        let span = Span::empty(5u32);
        assert!(span.is_empty());
        assert!(!span.contains(TextSize::from(5)));
    }

    #[test]
    fn test_span_slice() {
        let source = "foo @bar baz";
        assert_eq!(Span::from_offsets(4, 8).slice(source), "@bar");
        assert_eq!(Span::from_offsets(10, 40).slice(source), "");
    }

    #[test]
    fn test_span_cover() {
        let covered = Span::new(5u32, 10u32).cover(Span::new(8u32, 20u32));
        assert_eq!(covered, Span::new(5u32, 20u32));
    }
}
