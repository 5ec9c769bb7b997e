//! Source documents.

use source_map::{LineIndex, SourceLocation, SourceSpan};
use std::sync::Arc;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A document to parse: its text, an optional file path and a line index.
///
/// Cheap to clone; the text and line table are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RazorSourceDocument {
    text: Arc<str>,
    file_path: Option<Arc<str>>,
    encoding: &'static str,
    lines: Arc<LineIndex>,
}

impl RazorSourceDocument {
    pub fn new(text: impl Into<Arc<str>>, file_path: Option<&str>) -> Self {
        let text = text.into();
        let lines = Arc::new(LineIndex::new(&text));
        Self {
            text,
            file_path: file_path.map(Arc::from),
            encoding: "utf-8",
            lines,
        }
    }

    /// Decodes UTF-8 bytes, dropping a leading byte order mark.
    pub fn from_bytes(bytes: &[u8], file_path: Option<&str>) -> Result<Self, std::str::Utf8Error> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text, file_path))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The character starting at byte `index`, if `index` is a char boundary.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index..)?.chars().next()
    }

    pub fn file_path(&self) -> Option<&Arc<str>> {
        self.file_path.as_ref()
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    pub fn get_location(&self, absolute_index: usize) -> SourceLocation {
        self.lines.get_location(absolute_index)
    }

    /// A span of this document starting at `start`.
    pub fn span(&self, start: SourceLocation, length: usize) -> SourceSpan {
        SourceSpan::from_location(self.file_path.clone(), start, length)
    }

    /// The text `span` covers, or `""` when it lies outside the document.
    pub fn slice(&self, span: &SourceSpan) -> &str {
        span.to_span().slice(&self.text)
    }
}
