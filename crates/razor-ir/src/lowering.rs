//! Lowering: syntax trees to an intermediate tree.
//!
//! Lowering reads chunk generators rather than re-interpreting text. Import
//! documents contribute only their usings and single-line directives; the
//! main document is lowered in full.

use crate::builder::IntermediateNodeBuilder;
use crate::naming::tag_helper_field_name;
use crate::node::{AnnotationKey, IntermediateNode, NodeKind, TokenKind};
use indexmap::IndexMap;
use log::debug;
use razor_parser::syntax::{
    Block, BlockChunkGenerator, BlockKind, LocationTagged, Span, SpanChunkGenerator, SyntaxNode, TagHelperInfo,
    TagMode,
};
use razor_parser::{DirectiveDescriptor, DirectiveKind, RazorSourceDocument, RazorSyntaxTree};
use razor_tag_helpers::TagHelperDescriptor;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use source_map::SourceSpan;
use std::sync::Arc;

pub const CHECKSUM_ALGORITHM: &str = "blake3";

struct UsingEntry {
    is_static: bool,
    source: SourceSpan,
    imported_from: Option<SmolStr>,
}

/// Lowers `tree`, after the usings and single-line directives of `imports`.
///
/// The returned document starts with a checksum of the source text followed
/// by every distinct using, then the document content in source order.
pub fn lower(tree: &RazorSyntaxTree, imports: &[RazorSyntaxTree]) -> IntermediateNode {
    let mut lowerer = Lowerer::new(tree.source());
    for import in imports {
        lowerer.lower_import(import);
    }
    lowerer.source = tree.source().clone();
    lowerer.visit_children(tree.root());

    let document = lowerer.finish(tree.source());
    debug!(
        "lowered {} into {} top-level node(s)",
        tree.source().file_path().map_or("<anonymous>", |path| path.as_ref()),
        document.children.len()
    );
    document
}

/// A checksum node for `source`.
pub fn checksum(source: &RazorSourceDocument) -> IntermediateNode {
    let digest = blake3::hash(source.text().as_bytes());
    IntermediateNode::new(NodeKind::Checksum {
        algorithm: CHECKSUM_ALGORITHM,
        digest: SmolStr::from(digest.to_hex().as_str()),
        file_path: source.file_path().map(|path| SmolStr::from(path.as_ref())),
    })
}

struct Lowerer {
    builder: IntermediateNodeBuilder,
    source: RazorSourceDocument,
    /// Keyed by namespace; insertion order is first appearance.
    usings: IndexMap<SmolStr, UsingEntry>,
    fields: FxHashSet<SmolStr>,
    imported_from: Option<SmolStr>,
}

impl Lowerer {
    fn new(source: &RazorSourceDocument) -> Self {
        Self {
            builder: IntermediateNodeBuilder::new(IntermediateNode::document()),
            source: source.clone(),
            usings: IndexMap::new(),
            fields: FxHashSet::default(),
            imported_from: None,
        }
    }

    fn lower_import(&mut self, import: &RazorSyntaxTree) {
        self.source = import.source().clone();
        self.imported_from = Some(
            import
                .source()
                .file_path()
                .map_or_else(SmolStr::default, |path| SmolStr::from(path.as_ref())),
        );

        for child in import.root().children() {
            let Some(block) = child.as_block() else {
                continue;
            };
            if block.kind != BlockKind::Directive {
                continue;
            }
            match block.generator.directive() {
                Some(descriptor) if descriptor.kind == DirectiveKind::SingleLine => {
                    self.visit_directive(block, descriptor)
                }
                Some(_) => {}
                None => self.visit_children(block),
            }
        }
        self.imported_from = None;
    }

    fn finish(self, source: &RazorSourceDocument) -> IntermediateNode {
        let Lowerer { builder, usings, .. } = self;
        let mut document = builder.build();

        let mut head = Vec::with_capacity(usings.len() + 1);
        head.push(checksum(source));
        for (namespace, entry) in usings {
            let mut node = IntermediateNode::new(NodeKind::UsingDirective {
                content: namespace,
                is_static: entry.is_static,
            })
            .with_source(Some(entry.source));
            if let Some(path) = entry.imported_from {
                node.annotate(AnnotationKey::Imported, path);
            }
            head.push(node);
        }
        document.children.splice(0..0, head);
        document
    }

    fn visit_children(&mut self, block: &Block) {
        for child in block.children() {
            self.visit_node(child);
        }
    }

    fn visit_node(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::Span(span) => self.visit_span(span),
            SyntaxNode::Block(block) => self.visit_block(block),
        }
    }

    fn visit_span(&mut self, span: &Arc<Span>) {
        match &span.generator {
            SpanChunkGenerator::Markup => {
                let source = self.span_source(span);
                self.add_html(span.content(), source);
            }
            SpanChunkGenerator::Statement => {
                if !span.content().is_empty() {
                    let source = self.span_source(span);
                    self.builder.add(
                        IntermediateNode::new(NodeKind::CSharpCode)
                            .with_source(Some(source.clone()))
                            .with_children(vec![IntermediateNode::token(
                                TokenKind::CSharp,
                                span.content(),
                                Some(source),
                            )]),
                    );
                }
            }
            SpanChunkGenerator::Expression => {
                if !span.content().is_empty() {
                    let source = self.span_source(span);
                    self.builder
                        .add(IntermediateNode::token(TokenKind::CSharp, span.content(), Some(source)));
                }
            }
            SpanChunkGenerator::LiteralAttribute { prefix, value } => self.add_literal_attribute(span, prefix, value),
            SpanChunkGenerator::DirectiveToken(descriptor) => {
                let source = self.span_source(span);
                self.builder.add(
                    IntermediateNode::new(NodeKind::DirectiveToken {
                        content: SmolStr::from(span.content()),
                        descriptor: descriptor.clone(),
                    })
                    .with_source(Some(source)),
                );
            }
            SpanChunkGenerator::AddImport { namespace, is_static } => {
                let source = self.span_source(span);
                // A repeated namespace keeps its first position and takes the
                // newest location.
                self.usings.insert(
                    namespace.clone(),
                    UsingEntry {
                        is_static: *is_static,
                        source,
                        imported_from: self.imported_from.clone(),
                    },
                );
            }
            SpanChunkGenerator::None
            | SpanChunkGenerator::AddTagHelper(_)
            | SpanChunkGenerator::RemoveTagHelper(_)
            | SpanChunkGenerator::TagHelperPrefix(_) => {}
        }
    }

    fn visit_block(&mut self, block: &Arc<Block>) {
        match &block.generator {
            BlockChunkGenerator::Directive(descriptor) => self.visit_directive(block, descriptor),
            BlockChunkGenerator::Expression => self.visit_composite(NodeKind::CSharpExpression, block),
            BlockChunkGenerator::Template => self.visit_composite(NodeKind::Template, block),
            BlockChunkGenerator::RazorComment => {}
            BlockChunkGenerator::Attribute { name, prefix, suffix } => {
                let source = self.block_source(block);
                self.builder.push(
                    IntermediateNode::new(NodeKind::HtmlAttribute {
                        name: name.clone(),
                        prefix: prefix.value.clone(),
                        suffix: suffix.value.clone(),
                    })
                    .with_source(Some(source)),
                );
                self.visit_children(block);
                self.builder.pop();
            }
            BlockChunkGenerator::DynamicAttribute { prefix, .. } => self.visit_dynamic_attribute(block, prefix),
            BlockChunkGenerator::TagHelper(info) => self.visit_tag_helper(block, info),
            BlockChunkGenerator::Statement | BlockChunkGenerator::None => self.visit_children(block),
        }
    }

    fn visit_directive(&mut self, block: &Block, descriptor: &Arc<DirectiveDescriptor>) {
        let name = descriptor.directive.clone();
        let descriptor = Arc::clone(descriptor);
        let kind = if block.diagnostics.is_empty() {
            NodeKind::Directive { name, descriptor }
        } else {
            NodeKind::MalformedDirective { name, descriptor }
        };

        let mut node = IntermediateNode::new(kind).with_source(Some(self.block_source(block)));
        node.diagnostics = block.diagnostics.clone();
        if let Some(path) = &self.imported_from {
            node.annotate(AnnotationKey::Imported, path.clone());
        }

        self.builder.push(node);
        self.visit_children(block);
        self.builder.pop();
    }

    /// Expressions and templates take their span from their content, not
    /// from the transition and delimiters around it.
    fn visit_composite(&mut self, kind: NodeKind, block: &Block) {
        self.builder.push(IntermediateNode::new(kind));
        self.visit_children(block);

        let fallback = self.block_source(block);
        let node = self.builder.current_mut();
        node.source = Some(synthesize_span(&node.children).unwrap_or(fallback));
        self.builder.pop();
    }

    fn visit_dynamic_attribute(&mut self, block: &Block, prefix: &LocationTagged<SmolStr>) {
        let significant: Vec<&SyntaxNode> = block
            .children()
            .iter()
            .filter(|child| {
                child
                    .as_span()
                    .map_or(true, |span| !matches!(span.generator, SpanChunkGenerator::None))
            })
            .collect();
        let expression = match significant.as_slice() {
            [only] => only
                .as_block()
                .filter(|inner| matches!(inner.generator, BlockChunkGenerator::Expression)),
            _ => None,
        };

        let source = self.block_source(block);
        let prefix = prefix.value.clone();
        match expression {
            Some(expression) => {
                self.builder.push(
                    IntermediateNode::new(NodeKind::CSharpExpressionAttributeValue { prefix })
                        .with_source(Some(source)),
                );
                self.visit_children(expression);
            }
            None => {
                self.builder.push(
                    IntermediateNode::new(NodeKind::CSharpCodeAttributeValue { prefix }).with_source(Some(source)),
                );
                self.visit_children(block);
            }
        }
        self.builder.pop();
    }

    fn visit_tag_helper(&mut self, block: &Block, info: &TagHelperInfo) {
        let source = self.block_source(block);
        self.builder.push(
            IntermediateNode::new(NodeKind::TagHelper {
                tag_name: info.tag_name.clone(),
                tag_mode: info.tag_mode,
            })
            .with_source(Some(source)),
        );

        if info.tag_mode == TagMode::StartTagAndEndTag {
            let children = block.children();
            let body_end = if has_end_tag(children, &info.tag_name) {
                children.len() - 1
            } else {
                children.len()
            };
            self.builder.push(IntermediateNode::new(NodeKind::TagHelperBody));
            for child in children.get(1..body_end).unwrap_or_default() {
                self.visit_node(child);
            }
            self.builder.pop();
        }

        for descriptor in info.descriptors() {
            let field_name = self.declare_field(descriptor);
            self.builder.add(IntermediateNode::new(NodeKind::CreateTagHelper {
                field_name,
                type_name: descriptor.name.clone(),
                descriptor: Arc::clone(descriptor),
            }));
        }

        for attribute in &info.attributes {
            let source = attribute.value.as_ref().map(|value| self.node_source(value));
            if attribute.is_bound() {
                for bound in &attribute.matches {
                    let is_string = if bound.is_indexer {
                        bound.attribute.is_indexer_string_property()
                    } else {
                        bound.attribute.is_string_property()
                    };
                    self.builder.push(
                        IntermediateNode::new(NodeKind::SetTagHelperProperty {
                            field_name: tag_helper_field_name(&bound.descriptor.name),
                            attribute_name: attribute.name.clone(),
                            property_name: bound.attribute.property_name.clone(),
                            value_style: attribute.value_style,
                            descriptor: Arc::clone(&bound.descriptor),
                            bound_attribute: bound.attribute.clone(),
                            is_indexer: bound.is_indexer,
                        })
                        .with_source(source.clone()),
                    );
                    if let Some(value) = &attribute.value {
                        self.visit_attribute_value(value, !is_string);
                    }
                    self.builder.pop();
                }
            } else {
                self.builder.push(
                    IntermediateNode::new(NodeKind::AddTagHelperHtmlAttribute {
                        attribute_name: attribute.name.clone(),
                        value_style: attribute.value_style,
                    })
                    .with_source(source),
                );
                if let Some(value) = &attribute.value {
                    self.visit_attribute_value(value, false);
                }
                self.builder.pop();
            }
        }

        self.builder.pop();
    }

    /// Lowers a tag helper attribute value. Literal text becomes HTML, or C#
    /// when the property is not a string.
    fn visit_attribute_value(&mut self, node: &SyntaxNode, as_code: bool) {
        match node {
            SyntaxNode::Span(span) => match &span.generator {
                SpanChunkGenerator::Markup | SpanChunkGenerator::LiteralAttribute { .. } => {
                    let source = self.span_source(span);
                    if as_code {
                        self.add_code_expression(span.content(), source);
                    } else {
                        self.add_html(span.content(), source);
                    }
                }
                _ => {}
            },
            SyntaxNode::Block(block) => match &block.generator {
                BlockChunkGenerator::None
                | BlockChunkGenerator::Attribute { .. }
                | BlockChunkGenerator::DynamicAttribute { .. } => {
                    for child in block.children() {
                        self.visit_attribute_value(child, as_code);
                    }
                }
                _ => self.visit_block(block),
            },
        }
    }

    /// One field per tag helper type, placed ahead of the first use.
    fn declare_field(&mut self, descriptor: &TagHelperDescriptor) -> SmolStr {
        let field_name = tag_helper_field_name(&descriptor.name);
        if self.fields.insert(field_name.clone()) {
            self.builder.add_to_root(
                IntermediateNode::new(NodeKind::FieldDeclaration {
                    modifiers: vec![SmolStr::new_static("private")],
                    field_type: descriptor.name.clone(),
                    field_name: field_name.clone(),
                })
                .with_annotation(AnnotationKey::TagHelperField, descriptor.name.clone()),
            );
        }
        field_name
    }

    /// Adds HTML, merging into the previous HTML node when the two are
    /// adjacent in the source.
    fn add_html(&mut self, content: &str, source: SourceSpan) {
        if content.is_empty() {
            return;
        }
        let token = IntermediateNode::token(TokenKind::Html, content, Some(source.clone()));
        if let Some(last) = self.builder.current_mut().children.last_mut() {
            if matches!(last.kind, NodeKind::HtmlContent) {
                if let Some(previous) = last.source.as_mut() {
                    if previous.end_index() == source.absolute_index && previous.file_path == source.file_path {
                        previous.length += source.length;
                        last.children.push(token);
                        return;
                    }
                }
            }
        }
        self.builder.add(
            IntermediateNode::new(NodeKind::HtmlContent)
                .with_source(Some(source))
                .with_children(vec![token]),
        );
    }

    fn add_code_expression(&mut self, content: &str, source: SourceSpan) {
        if content.is_empty() {
            return;
        }
        self.builder.add(
            IntermediateNode::new(NodeKind::CSharpExpression)
                .with_source(Some(source.clone()))
                .with_children(vec![IntermediateNode::token(TokenKind::CSharp, content, Some(source))]),
        );
    }

    fn add_literal_attribute(
        &mut self,
        span: &Span,
        prefix: &LocationTagged<SmolStr>,
        value: &LocationTagged<SmolStr>,
    ) {
        let source = self.span_source(span);
        let value_source = self.source.span(value.location, value.value.len());
        self.builder.add(
            IntermediateNode::new(NodeKind::HtmlAttributeValue {
                prefix: prefix.value.clone(),
            })
            .with_source(Some(source))
            .with_children(vec![IntermediateNode::token(
                TokenKind::Html,
                value.value.as_str(),
                Some(value_source),
            )]),
        );
    }

    fn span_source(&self, span: &Span) -> SourceSpan {
        self.source.span(span.start(), span.length())
    }

    fn block_source(&self, block: &Block) -> SourceSpan {
        self.source.span(block.start(), block.length())
    }

    fn node_source(&self, node: &SyntaxNode) -> SourceSpan {
        self.source.span(node.start(), node.length())
    }
}

/// The span from the first located child to the end of the last one.
fn synthesize_span(children: &[IntermediateNode]) -> Option<SourceSpan> {
    let first = children.iter().find_map(|child| child.source.as_ref())?;
    let last = children.iter().rev().find_map(|child| child.source.as_ref())?;
    Some(SourceSpan {
        length: last.end_index().saturating_sub(first.absolute_index),
        ..first.clone()
    })
}

fn has_end_tag(children: &[SyntaxNode], tag_name: &str) -> bool {
    if children.len() < 2 {
        return false;
    }
    children
        .last()
        .and_then(SyntaxNode::as_block)
        .filter(|block| block.kind == BlockKind::Tag && matches!(block.generator, BlockChunkGenerator::None))
        .and_then(|block| end_tag_name(&block.content()).map(|name| name.eq_ignore_ascii_case(tag_name)))
        .unwrap_or(false)
}

fn end_tag_name(content: &str) -> Option<String> {
    let rest = content.strip_prefix("</")?;
    let name: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>')
        .collect();
    Some(name)
}
