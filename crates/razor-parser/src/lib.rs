//! Razor template parser.
//!
//! This crate turns a Razor source document into a syntax tree:
//! - HTML and C# tokenizers using `logos`
//! - A recursive descent parser that alternates between markup and code
//! - Descriptor-driven directive parsing
//! - Tree rewriters, including tag helper binding
//!
//! # Example
//!
//! ```
//! use razor_parser::{parse, RazorLanguageVersion, RazorParserOptions, RazorSourceDocument};
//!
//! let source = RazorSourceDocument::new("<p>Hello @name!</p>", Some("Index.cshtml"));
//! let options = RazorParserOptions::new(RazorLanguageVersion::LATEST);
//!
//! let tree = parse(&source, &options);
//! assert!(tree.all_diagnostics().is_empty());
//! assert_eq!(tree.root().length(), source.len());
//! ```

pub mod directives;
mod options;
mod parser;
pub mod rewrite;
mod source;
pub mod syntax;
pub mod tokenizer;

pub use directives::{
    builtin_directives, DirectiveDescriptor, DirectiveDescriptorBuilder, DirectiveError, DirectiveKind,
    DirectiveTokenDescriptor, DirectiveTokenKind, DirectiveUsage,
};
pub use options::{RazorLanguageVersion, RazorParserFeatureFlags, RazorParserOptions, UnknownLanguageVersion};
pub use source::RazorSourceDocument;
pub use syntax::{RazorSyntaxTree, SyntaxNode};

use log::debug;
use std::sync::Arc;

/// Parses `source` and runs the default rewriters.
///
/// Parsing never fails; problems are reported as diagnostics on the tree.
pub fn parse(source: &RazorSourceDocument, options: &RazorParserOptions) -> RazorSyntaxTree {
    let tree = parser::Parser::new(source, Arc::new(options.clone())).parse();
    let tree = rewrite::apply_default_rewriters(&tree);
    debug!(
        "parsed {} with {} diagnostic(s)",
        source.file_path().map_or("<anonymous>", |path| path.as_ref()),
        tree.all_diagnostics().len()
    );
    tree
}
