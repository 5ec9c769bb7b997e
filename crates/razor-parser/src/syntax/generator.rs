//! Chunk generators: the semantic role attached to spans and blocks.
//!
//! Lowering reads these instead of re-interpreting text.

use super::tag_helper::TagHelperInfo;
use crate::directives::{DirectiveDescriptor, DirectiveTokenDescriptor};
use razor_diagnostics::RazorDiagnostic;
use smol_str::SmolStr;
use source_map::SourceLocation;
use std::sync::Arc;

/// A value together with where it starts in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationTagged<T> {
    pub value: T,
    pub location: SourceLocation,
}

impl<T> LocationTagged<T> {
    pub fn new(value: T, location: SourceLocation) -> Self {
        Self { value, location }
    }
}

/// The parsed value of an `@addTagHelper`, `@removeTagHelper` or
/// `@tagHelperPrefix` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperDirective {
    /// The directive value exactly as written.
    pub directive_text: SmolStr,
    /// The value with surrounding whitespace and quotes removed.
    pub lookup_text: SmolStr,
    /// Problems with the value. Reported by the binding pass.
    pub diagnostics: Vec<RazorDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpanChunkGenerator {
    /// Contributes nothing to the output.
    #[default]
    None,
    Markup,
    Statement,
    Expression,
    /// One literal piece of a conditional attribute value.
    LiteralAttribute {
        prefix: LocationTagged<SmolStr>,
        value: LocationTagged<SmolStr>,
    },
    DirectiveToken(DirectiveTokenDescriptor),
    /// `@using Namespace`.
    AddImport {
        namespace: SmolStr,
        is_static: bool,
    },
    AddTagHelper(TagHelperDirective),
    RemoveTagHelper(TagHelperDirective),
    TagHelperPrefix(TagHelperDirective),
}

impl SpanChunkGenerator {
    pub fn tag_helper_directive(&self) -> Option<&TagHelperDirective> {
        match self {
            SpanChunkGenerator::AddTagHelper(directive)
            | SpanChunkGenerator::RemoveTagHelper(directive)
            | SpanChunkGenerator::TagHelperPrefix(directive) => Some(directive),
            _ => None,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            SpanChunkGenerator::None => "None",
            SpanChunkGenerator::Markup => "Markup",
            SpanChunkGenerator::Statement => "Statement",
            SpanChunkGenerator::Expression => "Expression",
            SpanChunkGenerator::LiteralAttribute { .. } => "LiteralAttribute",
            SpanChunkGenerator::DirectiveToken(_) => "DirectiveToken",
            SpanChunkGenerator::AddImport { .. } => "AddImport",
            SpanChunkGenerator::AddTagHelper(_) => "AddTagHelper",
            SpanChunkGenerator::RemoveTagHelper(_) => "RemoveTagHelper",
            SpanChunkGenerator::TagHelperPrefix(_) => "TagHelperPrefix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockChunkGenerator {
    #[default]
    None,
    Statement,
    Expression,
    Template,
    RazorComment,
    Directive(Arc<DirectiveDescriptor>),
    /// A conditional attribute: `name="` prefix, value segments, `"` suffix.
    Attribute {
        name: SmolStr,
        prefix: LocationTagged<SmolStr>,
        suffix: LocationTagged<SmolStr>,
    },
    /// A code segment inside a conditional attribute value.
    DynamicAttribute {
        prefix: LocationTagged<SmolStr>,
        value_start: SourceLocation,
    },
    TagHelper(Arc<TagHelperInfo>),
}

impl BlockChunkGenerator {
    pub fn directive(&self) -> Option<&Arc<DirectiveDescriptor>> {
        match self {
            BlockChunkGenerator::Directive(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn tag_helper(&self) -> Option<&Arc<TagHelperInfo>> {
        match self {
            BlockChunkGenerator::TagHelper(info) => Some(info),
            _ => None,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            BlockChunkGenerator::None => "None",
            BlockChunkGenerator::Statement => "Statement",
            BlockChunkGenerator::Expression => "Expression",
            BlockChunkGenerator::Template => "Template",
            BlockChunkGenerator::RazorComment => "RazorComment",
            BlockChunkGenerator::Directive(_) => "Directive",
            BlockChunkGenerator::Attribute { .. } => "Attribute",
            BlockChunkGenerator::DynamicAttribute { .. } => "DynamicAttribute",
            BlockChunkGenerator::TagHelper(_) => "TagHelper",
        }
    }
}
