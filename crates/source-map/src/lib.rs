//! Source position tracking for the Razor front end.
//!
//! This crate provides the position vocabulary shared by every stage of the
//! pipeline: byte ranges for tokens, line/column aware locations for syntax
//! nodes, and file-qualified spans for diagnostics and IR nodes.

mod line_index;
mod location;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use location::{SourceLocation, SourceSpan};
pub use span::{ByteOffset, Span};
