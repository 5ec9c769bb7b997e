//! Intermediate representation for Razor documents.
//!
//! - [`lower`] turns a syntax tree (and its imports) into a flat document
//! - [`classify`] gives the document its namespace / class / method skeleton
//! - [`IntermediateNodePass`]es then adjust the classified document
//!
//! # Example
//!
//! ```
//! use razor_ir::{classify, dump, lower, CodeGenerationOptions, DefaultDocumentClassifier, PassContext};
//! use razor_parser::{parse, RazorLanguageVersion, RazorParserOptions, RazorSourceDocument};
//!
//! let source = RazorSourceDocument::new("<p>@name</p>", Some("Index.cshtml"));
//! let tree = parse(&source, &RazorParserOptions::new(RazorLanguageVersion::LATEST));
//!
//! let mut document = lower(&tree, &[]);
//! let options = CodeGenerationOptions::default();
//! let context = PassContext { source: &source, options: &options };
//! classify(&context, &[&DefaultDocumentClassifier], &mut document);
//!
//! assert!(dump(&document).contains("ClassDeclaration Index"));
//! ```

mod builder;
mod classifier;
mod lowering;
mod naming;
mod node;
mod options;
mod passes;

pub use builder::IntermediateNodeBuilder;
pub use classifier::{classify, DefaultDocumentClassifier, DocumentClassifier, DocumentSkeleton, DEFAULT_DOCUMENT_KIND};
pub use lowering::{checksum, lower, CHECKSUM_ALGORITHM};
pub use naming::{class_name_from_path, sanitize_identifier, tag_helper_field_name};
pub use node::{dump, AnnotationKey, IntermediateNode, NodeKind, TokenKind};
pub use options::CodeGenerationOptions;
pub use passes::{
    default_passes, FunctionsDirectivePass, InheritsDirectivePass, IntermediateNodePass, PassContext,
    SectionDirectivePass, DEFAULT_PASS_ORDER,
};
