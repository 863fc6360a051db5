//! Byte spans into a single source unit.

use std::ops::Range;
use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
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

    /// Creates a span from `usize` offsets, as produced by string slicing.
    ///
    /// Sources larger than `u32::MAX` bytes are not supported; offsets saturate.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        Self::new(to_size(start), to_size(end))
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

    /// Returns true if this span contains the given offset.
    #[inline]
    pub fn contains(&self, offset: ByteOffset) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns true if the two spans share at least one byte.
    #[inline]
    pub fn overlaps(&self, other: Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// The start offset as a `usize`, for slicing.
    #[inline]
    pub fn start_usize(&self) -> usize {
        u32::from(self.start) as usize
    }

    /// The end offset as a `usize`, for slicing.
    #[inline]
    pub fn end_usize(&self) -> usize {
        u32::from(self.end) as usize
    }

    /// The span as a `usize` range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start_usize()..self.end_usize()
    }

    /// Returns the text this span covers in `source`.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range()]
    }
}

fn to_size(offset: usize) -> TextSize {
    TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX))
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

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::from_usize(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_usize() {
        let span = Span::from_usize(3, 9);
        assert_eq!(span.start, TextSize::from(3));
        assert_eq!(span.end, TextSize::from(9));
        assert_eq!(span.range(), 3..9);
    }

    #[test]
    fn test_span_text() {
        let source = "const x: number = 1;";
        let span = Span::from_usize(7, 15);
        assert_eq!(span.text(source), ": number");
    }

    #[test]
    fn test_span_contains_is_half_open() {
        let span = Span::new(5u32, 15u32);
        assert!(!span.contains(TextSize::from(4)));
        assert!(span.contains(TextSize::from(5)));
        assert!(!span.contains(TextSize::from(15)));
    }

    #[test]
    fn test_span_overlaps() {
        let a = Span::new(0u32, 4u32);
        assert!(a.overlaps(Span::new(3u32, 6u32)));
        assert!(!a.overlaps(Span::new(4u32, 6u32)));
        assert!(!a.overlaps(Span::empty(2u32)));
    }

    #[test]
    fn test_span_cover() {
        let covered = Span::new(5u32, 10u32).cover(Span::new(8u32, 20u32));
        assert_eq!(covered, Span::new(5u32, 20u32));
    }
}
