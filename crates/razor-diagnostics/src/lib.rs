//! Diagnostics for the Razor front end.
//!
//! Parsing and rewriting never fail on malformed documents. Problems are
//! recorded as [`RazorDiagnostic`] values that carry a stable `RZxxxx` id, a
//! [`Severity`] and the exact [`source_map::SourceSpan`] they refer to.
//!
//! # Example
//!
//! ```
//! use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
//! use source_map::SourceSpan;
//!
//! let diagnostic = RazorDiagnostic::new(
//!     DiagnosticCode::DirectiveMustHaveValue,
//!     SourceSpan::default(),
//!     &["addTagHelper"],
//! );
//! assert_eq!(diagnostic.id(), "RZ1018");
//! ```

mod diagnostic;

pub use diagnostic::{DiagnosticCode, RazorDiagnostic, Severity};

/// Returns true if any diagnostic is an error.
pub fn has_errors<'a>(diagnostics: impl IntoIterator<Item = &'a RazorDiagnostic>) -> bool {
    diagnostics
        .into_iter()
        .any(|d| d.severity == Severity::Error)
}
