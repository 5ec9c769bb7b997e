//! Razor engine.
//!
//! Runs a source document, and the imports that apply to it, through the
//! whole front end:
//! 1. parse the document and its imports
//! 2. syntax tree passes (nested section checks, tag helper binding)
//! 3. lower to the intermediate representation
//! 4. classify into a namespace / class / method skeleton
//! 5. document passes (`@functions`, `@inherits`, `@section`)
//!
//! # Example
//!
//! ```
//! use razor_engine::RazorEngine;
//! use razor_parser::{DirectiveDescriptor, RazorSourceDocument};
//!
//! let custom = DirectiveDescriptor::create_single_line_directive("custom", |builder| {
//!     builder.add_string_token();
//! })
//! .unwrap();
//! let engine = RazorEngine::builder().directive(custom).build().unwrap();
//!
//! let source = RazorSourceDocument::new("@custom \"AString\"\n<p>@Model.Name</p>", Some("Views/Index.cshtml"));
//! let document = engine.process(&source, &[]);
//!
//! assert!(document.diagnostics().is_empty());
//! assert_eq!(document.class_name().as_deref(), Some("Views_Index"));
//! ```

mod config;
mod document;
mod engine;
mod error;
pub mod passes;
mod tag_helpers;

pub use config::{
    DirectiveConfiguration, DirectiveKindConfiguration, DirectiveTokenConfiguration, DirectiveTokenKindConfiguration,
    DirectiveUsageConfiguration, RazorConfiguration,
};
pub use document::RazorCodeDocument;
pub use engine::{RazorEngine, RazorEngineBuilder};
pub use error::EngineError;
pub use passes::{NestedSectionPass, RazorSyntaxTreePass, SyntaxTreePassContext, TagHelperBinderPass};
pub use tag_helpers::{resolve_tag_helpers, TagHelperDirectiveResolver, TagHelperDocumentContext};
