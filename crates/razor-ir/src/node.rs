//! Intermediate nodes.
//!
//! A lowered document is a tree of [`IntermediateNode`]s. The node kind
//! carries kind-specific data; children, an optional source span,
//! diagnostics and annotations are shared by every kind.

use razor_diagnostics::RazorDiagnostic;
use razor_parser::syntax::{AttributeValueStyle, TagMode};
use razor_parser::{DirectiveDescriptor, DirectiveTokenDescriptor};
use razor_tag_helpers::{BoundAttributeDescriptor, TagHelperDescriptor};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use source_map::SourceSpan;
use std::fmt::Write;
use std::sync::Arc;

/// Whether an [`NodeKind::IntermediateToken`] holds HTML or C#.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Html,
    CSharp,
}

/// Keys of the per-node annotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    PrimaryNamespace,
    PrimaryClass,
    PrimaryMethod,
    /// A field holding a tag helper instance.
    TagHelperField,
    /// The node came from an import document; the value is its path.
    Imported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document {
        /// Set by the classifier that claimed the document.
        document_kind: Option<SmolStr>,
    },
    Checksum {
        algorithm: &'static str,
        digest: SmolStr,
        file_path: Option<SmolStr>,
    },
    NamespaceDeclaration {
        content: SmolStr,
    },
    ClassDeclaration {
        modifiers: Vec<SmolStr>,
        class_name: SmolStr,
        base_type: Option<SmolStr>,
    },
    MethodDeclaration {
        modifiers: Vec<SmolStr>,
        method_name: SmolStr,
        return_type: SmolStr,
    },
    FieldDeclaration {
        modifiers: Vec<SmolStr>,
        field_type: SmolStr,
        field_name: SmolStr,
    },
    UsingDirective {
        content: SmolStr,
        is_static: bool,
    },
    Directive {
        name: SmolStr,
        descriptor: Arc<DirectiveDescriptor>,
    },
    /// A directive whose block carried diagnostics.
    MalformedDirective {
        name: SmolStr,
        descriptor: Arc<DirectiveDescriptor>,
    },
    DirectiveToken {
        content: SmolStr,
        descriptor: DirectiveTokenDescriptor,
    },
    HtmlContent,
    HtmlAttribute {
        name: SmolStr,
        prefix: SmolStr,
        suffix: SmolStr,
    },
    HtmlAttributeValue {
        prefix: SmolStr,
    },
    CSharpExpressionAttributeValue {
        prefix: SmolStr,
    },
    CSharpCodeAttributeValue {
        prefix: SmolStr,
    },
    CSharpCode,
    CSharpExpression,
    Template,
    Section {
        section_name: SmolStr,
    },
    TagHelper {
        tag_name: SmolStr,
        tag_mode: TagMode,
    },
    TagHelperBody,
    CreateTagHelper {
        field_name: SmolStr,
        type_name: SmolStr,
        descriptor: Arc<TagHelperDescriptor>,
    },
    SetTagHelperProperty {
        field_name: SmolStr,
        attribute_name: SmolStr,
        property_name: SmolStr,
        value_style: AttributeValueStyle,
        descriptor: Arc<TagHelperDescriptor>,
        bound_attribute: BoundAttributeDescriptor,
        is_indexer: bool,
    },
    AddTagHelperHtmlAttribute {
        attribute_name: SmolStr,
        value_style: AttributeValueStyle,
    },
    IntermediateToken {
        kind: TokenKind,
        content: String,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document { .. } => "Document",
            NodeKind::Checksum { .. } => "Checksum",
            NodeKind::NamespaceDeclaration { .. } => "NamespaceDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::FieldDeclaration { .. } => "FieldDeclaration",
            NodeKind::UsingDirective { .. } => "UsingDirective",
            NodeKind::Directive { .. } => "Directive",
            NodeKind::MalformedDirective { .. } => "MalformedDirective",
            NodeKind::DirectiveToken { .. } => "DirectiveToken",
            NodeKind::HtmlContent => "HtmlContent",
            NodeKind::HtmlAttribute { .. } => "HtmlAttribute",
            NodeKind::HtmlAttributeValue { .. } => "HtmlAttributeValue",
            NodeKind::CSharpExpressionAttributeValue { .. } => "CSharpExpressionAttributeValue",
            NodeKind::CSharpCodeAttributeValue { .. } => "CSharpCodeAttributeValue",
            NodeKind::CSharpCode => "CSharpCode",
            NodeKind::CSharpExpression => "CSharpExpression",
            NodeKind::Template => "Template",
            NodeKind::Section { .. } => "Section",
            NodeKind::TagHelper { .. } => "TagHelper",
            NodeKind::TagHelperBody => "TagHelperBody",
            NodeKind::CreateTagHelper { .. } => "CreateTagHelper",
            NodeKind::SetTagHelperProperty { .. } => "SetTagHelperProperty",
            NodeKind::AddTagHelperHtmlAttribute { .. } => "AddTagHelperHtmlAttribute",
            NodeKind::IntermediateToken { .. } => "IntermediateToken",
        }
    }

    /// Nodes that belong to the class body rather than the render method.
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            NodeKind::FieldDeclaration { .. } | NodeKind::MethodDeclaration { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateNode {
    pub kind: NodeKind,
    pub source: Option<SourceSpan>,
    pub children: Vec<IntermediateNode>,
    pub diagnostics: Vec<RazorDiagnostic>,
    annotations: FxHashMap<AnnotationKey, SmolStr>,
}

impl IntermediateNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            source: None,
            children: Vec::new(),
            diagnostics: Vec::new(),
            annotations: FxHashMap::default(),
        }
    }

    pub fn document() -> Self {
        Self::new(NodeKind::Document { document_kind: None })
    }

    pub fn token(kind: TokenKind, content: impl Into<String>, source: Option<SourceSpan>) -> Self {
        Self::new(NodeKind::IntermediateToken {
            kind,
            content: content.into(),
        })
        .with_source(source)
    }

    pub fn with_source(mut self, source: Option<SourceSpan>) -> Self {
        self.source = source;
        self
    }

    pub fn with_children(mut self, children: Vec<IntermediateNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_annotation(mut self, key: AnnotationKey, value: impl Into<SmolStr>) -> Self {
        self.annotate(key, value);
        self
    }

    pub fn annotate(&mut self, key: AnnotationKey, value: impl Into<SmolStr>) {
        self.annotations.insert(key, value.into());
    }

    pub fn annotation(&self, key: AnnotationKey) -> Option<&str> {
        self.annotations.get(&key).map(SmolStr::as_str)
    }

    pub fn has_annotation(&self, key: AnnotationKey) -> bool {
        self.annotations.contains_key(&key)
    }

    pub fn document_kind(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Document { document_kind } => document_kind.as_deref(),
            _ => None,
        }
    }

    /// Concatenated content of the token children.
    pub fn token_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let NodeKind::IntermediateToken { content, .. } = &child.kind {
                out.push_str(content);
            }
        }
        out
    }

    /// This node and everything below it, parents before children.
    pub fn descendants(&self) -> impl Iterator<Item = &IntermediateNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// The first node below `self` carrying `key`, searching depth first.
    pub fn find_annotated_mut(&mut self, key: AnnotationKey) -> Option<&mut IntermediateNode> {
        if self.has_annotation(key) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_annotated_mut(key))
    }

    pub fn find_annotated(&self, key: AnnotationKey) -> Option<&IntermediateNode> {
        self.descendants().find(|node| node.has_annotation(key))
    }

    /// Removes every descendant matching `predicate`, returning them in
    /// document order. Matching nodes are not searched further.
    pub fn extract_where(
        &mut self,
        predicate: &mut dyn FnMut(&IntermediateNode) -> bool,
    ) -> Vec<IntermediateNode> {
        let mut out = Vec::new();
        extract_into(self, predicate, &mut out);
        out
    }

    /// Applies `f` to every descendant, children before parents.
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut IntermediateNode)) {
        for child in &mut self.children {
            child.for_each_mut(f);
        }
        f(self);
    }

    /// Diagnostics of this node and every descendant.
    pub fn all_diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.descendants()
            .flat_map(|node| node.diagnostics.iter().cloned())
            .collect()
    }
}

fn extract_into(
    node: &mut IntermediateNode,
    predicate: &mut dyn FnMut(&IntermediateNode) -> bool,
    out: &mut Vec<IntermediateNode>,
) {
    let children = std::mem::take(&mut node.children);
    for mut child in children {
        if predicate(&child) {
            out.push(child);
        } else {
            extract_into(&mut child, predicate, out);
            node.children.push(child);
        }
    }
}

/// Renders an intermediate tree one node per line, for tests and debugging.
///
/// ```text
/// Document
///     HtmlContent [0..6)
///         IntermediateToken Html "<p>hi"
/// ```
pub fn dump(node: &IntermediateNode) -> String {
    let mut out = String::new();
    dump_node(node, 0, &mut out);
    out
}

fn dump_node(node: &IntermediateNode, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    let _ = write!(out, "{indent}{}", node.kind.name());
    match &node.kind {
        NodeKind::Document { document_kind: Some(kind) } => {
            let _ = write!(out, " {kind}");
        }
        NodeKind::NamespaceDeclaration { content } => {
            let _ = write!(out, " {content}");
        }
        NodeKind::ClassDeclaration {
            class_name,
            base_type,
            ..
        } => {
            let _ = write!(out, " {class_name}");
            if let Some(base_type) = base_type {
                let _ = write!(out, " : {base_type}");
            }
        }
        NodeKind::MethodDeclaration { method_name, .. } => {
            let _ = write!(out, " {method_name}");
        }
        NodeKind::FieldDeclaration {
            field_type,
            field_name,
            ..
        } => {
            let _ = write!(out, " {field_type} {field_name}");
        }
        NodeKind::UsingDirective { content, is_static } => {
            let _ = write!(out, " {}{content}", if *is_static { "static " } else { "" });
        }
        NodeKind::Directive { name, .. } | NodeKind::MalformedDirective { name, .. } => {
            let _ = write!(out, " {name}");
        }
        NodeKind::DirectiveToken { content, .. } => {
            let _ = write!(out, " {content:?}");
        }
        NodeKind::HtmlAttribute { name, .. } => {
            let _ = write!(out, " {name}");
        }
        NodeKind::HtmlAttributeValue { prefix }
        | NodeKind::CSharpExpressionAttributeValue { prefix }
        | NodeKind::CSharpCodeAttributeValue { prefix } => {
            let _ = write!(out, " {prefix:?}");
        }
        NodeKind::Section { section_name } => {
            let _ = write!(out, " {section_name}");
        }
        NodeKind::TagHelper { tag_name, tag_mode } => {
            let _ = write!(out, " {tag_name} {tag_mode:?}");
        }
        NodeKind::CreateTagHelper { type_name, .. } => {
            let _ = write!(out, " {type_name}");
        }
        NodeKind::SetTagHelperProperty {
            attribute_name,
            property_name,
            ..
        } => {
            let _ = write!(out, " {attribute_name} -> {property_name}");
        }
        NodeKind::AddTagHelperHtmlAttribute { attribute_name, .. } => {
            let _ = write!(out, " {attribute_name}");
        }
        NodeKind::IntermediateToken { kind, content } => {
            let _ = write!(out, " {kind:?} {content:?}");
        }
        _ => {}
    }
    if let Some(source) = &node.source {
        let _ = write!(out, " [{}..{})", source.absolute_index, source.end_index());
    }
    out.push('\n');
    for child in &node.children {
        dump_node(child, depth + 1, out);
    }
}
