//! Line index for offset to line/column conversion.
//!
//! Line breaks are `\r\n`, `\r` and `\n`; a `\r\n` pair is a single break.

use crate::{ByteOffset, SourceLocation};
use text_size::TextSize;

/// A line and column position (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column (byte offset within the line).
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Maps absolute byte offsets to line/column positions.
///
/// Stores the byte offset of the start of each line so lookups are a binary
/// search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Creates a new line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    line_starts.push(TextSize::from(i as u32));
                }
                b'\r' | b'\n' => {
                    i += 1;
                    line_starts.push(TextSize::from(i as u32));
                }
                _ => i += 1,
            }
        }

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text in bytes.
    #[inline]
    pub fn len(&self) -> ByteOffset {
        self.len
    }

    /// Returns true if the indexed text was empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == TextSize::from(0)
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` if the offset lies past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        Some(LineCol {
            line: line as u32,
            col,
        })
    }

    /// Resolves an absolute offset to a full [`SourceLocation`].
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn get_location(&self, absolute_index: usize) -> SourceLocation {
        debug_assert!(
            absolute_index <= u32::from(self.len) as usize,
            "offset {absolute_index} is beyond the end of the document"
        );
        let clamped = absolute_index.min(u32::from(self.len) as usize);
        let line_col = self
            .line_col(TextSize::from(clamped as u32))
            .unwrap_or_default();
        SourceLocation::new(clamped, line_col.line as usize, line_col.col as usize)
    }

    /// Converts a line/column position to a byte offset.
    ///
    /// Returns `None` if the line is out of bounds.
    pub fn offset(&self, line_col: LineCol) -> Option<ByteOffset> {
        let line_start = *self.line_starts.get(line_col.line as usize)?;
        Some(line_start + TextSize::from(line_col.col))
    }

    /// Returns the byte offset where a line starts.
    pub fn line_start(&self, line: u32) -> Option<ByteOffset> {
        self.line_starts.get(line as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(TextSize::from(5)), Some(LineCol::new(0, 5)));
        assert_eq!(index.line_col(TextSize::from(12)), None);
    }

    #[test]
    fn test_mixed_line_endings() {
        let index = LineIndex::new("a\r\nb\rc\nd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_start(1), Some(TextSize::from(3)));
        assert_eq!(index.line_start(2), Some(TextSize::from(5)));
        assert_eq!(index.line_start(3), Some(TextSize::from(7)));
        assert_eq!(index.line_col(TextSize::from(6)), Some(LineCol::new(2, 1)));
    }

    #[test]
    fn test_crlf_is_one_break() {
        let index = LineIndex::new("\r\n\r\n");
        assert_eq!(index.line_count(), 3);
        // The `\n` of a pair still belongs to the first line.
        assert_eq!(index.line_col(TextSize::from(1)), Some(LineCol::new(0, 1)));
    }

    #[test]
    fn test_get_location() {
        let index = LineIndex::new("foo\n  @bar");
        let location = index.get_location(6);
        assert_eq!(location, SourceLocation::new(6, 1, 2));
    }

    #[test]
    fn test_offset_roundtrip() {
        let text = "hello\r\nworld\rfoo\n";
        let index = LineIndex::new(text);
        for offset in 0..=text.len() {
            let offset = TextSize::from(offset as u32);
            let line_col = index.line_col(offset).unwrap();
            assert_eq!(index.offset(line_col), Some(offset));
        }
    }
}
