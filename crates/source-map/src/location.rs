//! Absolute/line/column locations and file-qualified source spans.

use std::fmt;
use std::sync::Arc;

/// A position in a source document.
///
/// All three indices are 0-based; `character_index` is the byte column within
/// the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
}

impl SourceLocation {
    pub const ZERO: SourceLocation = SourceLocation {
        absolute_index: 0,
        line_index: 0,
        character_index: 0,
    };

    #[inline]
    pub const fn new(absolute_index: usize, line_index: usize, character_index: usize) -> Self {
        Self {
            absolute_index,
            line_index,
            character_index,
        }
    }

    /// Returns the location reached after reading `text` from `self`.
    ///
    /// `\r\n`, `\r` and `\n` each end a line.
    pub fn advance(self, text: &str) -> SourceLocation {
        let mut location = self;
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let width = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                _ => 1,
            };
            location.absolute_index += width;
            if matches!(bytes[i], b'\r' | b'\n') {
                location.line_index += 1;
                location.character_index = 0;
            } else {
                location.character_index += 1;
            }
            i += width;
        }
        location
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{})",
            self.absolute_index, self.line_index, self.character_index
        )
    }
}

/// A located range in a (possibly named) source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub file_path: Option<Arc<str>>,
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
    pub length: usize,
}

impl SourceSpan {
    /// A span with no file and no extent, used for synthesized content.
    pub const UNDEFINED: SourceSpan = SourceSpan {
        file_path: None,
        absolute_index: usize::MAX,
        line_index: usize::MAX,
        character_index: usize::MAX,
        length: usize::MAX,
    };

    pub fn new(
        file_path: Option<Arc<str>>,
        absolute_index: usize,
        line_index: usize,
        character_index: usize,
        length: usize,
    ) -> Self {
        Self {
            file_path,
            absolute_index,
            line_index,
            character_index,
            length,
        }
    }

    pub fn from_location(file_path: Option<Arc<str>>, start: SourceLocation, length: usize) -> Self {
        Self::new(
            file_path,
            start.absolute_index,
            start.line_index,
            start.character_index,
            length,
        )
    }

    /// The start of this span as a location.
    pub fn start(&self) -> SourceLocation {
        SourceLocation::new(self.absolute_index, self.line_index, self.character_index)
    }

    /// The absolute index one past the last byte.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.absolute_index + self.length
    }

    /// Converts to a byte [`crate::Span`].
    pub fn to_span(&self) -> crate::Span {
        crate::Span::from_offsets(self.absolute_index, self.end_index())
    }

    /// Returns the same span with a different length.
    pub fn with_length(&self, length: usize) -> SourceSpan {
        SourceSpan {
            length,
            ..self.clone()
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{} [{}] {})",
            self.absolute_index,
            self.line_index,
            self.character_index,
            self.length,
            self.file_path.as_deref().unwrap_or("<unknown>")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_advance_plain_text() {
        let location = SourceLocation::ZERO.advance("foo ");
        assert_eq!(location, SourceLocation::new(4, 0, 4));
    }

    #[test]
    fn test_advance_line_endings() {
        let location = SourceLocation::ZERO.advance("a\r\nb\rc\nde");
        assert_eq!(location, SourceLocation::new(9, 3, 2));
    }

    #[test]
    fn test_advance_from_midline() {
        let start = SourceLocation::new(3, 1, 2);
        assert_eq!(start.advance("xy\n"), SourceLocation::new(6, 2, 0));
    }

    #[test]
    fn test_span_display() {
        let span = SourceSpan::new(Some(Arc::from("Index.cshtml")), 4, 0, 4, 4);
        assert_eq!(span.to_string(), "(4:0,4 [4] Index.cshtml)");
        assert_eq!(span.end_index(), 8);
    }
}
