//! Rewrites elements bound to tag helpers into tag helper blocks.
//!
//! Tags are flat siblings in the parsed tree, so an element is found by
//! pairing a start tag with the matching end tag among the siblings that
//! follow it. Everything between the two becomes the body of the tag helper
//! block, which is rewritten in turn with the tag helper as parent.

use crate::options::RazorParserFeatureFlags;
use crate::parser::is_void_element;
use crate::syntax::{
    rebuild_if_changed, AcceptedCharacters, AttributeValueStyle, Block, BlockChunkGenerator, BlockKind,
    BoundAttributeMatch, RazorSyntaxTree, Span, SpanChunkGenerator, SpanKind, SyntaxNode, TagHelperAttributeNode,
    TagHelperInfo, TagMode,
};
use crate::tokenizer::{HtmlTokenKind, SyntaxToken};
use log::debug;
use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
use razor_tag_helpers::{conventions, TagHelperBinder, TagHelperBinding, TagHelperDescriptor, TagStructure};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use source_map::SourceLocation;
use std::sync::Arc;

/// Binds the elements of `tree` with `binder` and returns the rewritten
/// tree. Diagnostics of every descriptor that bound somewhere are added to
/// the tree once.
pub fn rewrite_tag_helpers(tree: &RazorSyntaxTree, binder: &TagHelperBinder) -> RazorSyntaxTree {
    if binder.is_empty() {
        return tree.clone();
    }
    let mut rewriter = TagHelperRewriter {
        binder,
        tree,
        feature_flags: tree.options().feature_flags,
        diagnostics: Vec::new(),
        used_descriptors: Vec::new(),
        seen_descriptors: FxHashSet::default(),
    };
    let root = tree.root();
    let context = ParentContext::default();
    let children = rewriter.rewrite_list(root.children(), &context);
    let root = match rebuild_if_changed(root, children) {
        SyntaxNode::Block(block) => block,
        SyntaxNode::Span(_) => Arc::clone(root),
    };

    let mut diagnostics = Vec::new();
    for descriptor in &rewriter.used_descriptors {
        diagnostics.extend(descriptor.all_diagnostics());
    }
    diagnostics.append(&mut rewriter.diagnostics);
    debug!(
        "tag helper rewrite bound {} descriptor(s), {} diagnostic(s)",
        rewriter.used_descriptors.len(),
        diagnostics.len()
    );
    tree.with_root(root, diagnostics)
}

/// The element enclosing a run of siblings.
#[derive(Debug, Clone, Default)]
struct ParentContext {
    tag_name: Option<SmolStr>,
    is_tag_helper: bool,
    /// Set when the enclosing tag helper restricts its children and the
    /// siblings are its direct content.
    restriction: Option<Arc<ChildRestriction>>,
}

#[derive(Debug)]
struct ChildRestriction {
    parent: SmolStr,
    allowed: Vec<SmolStr>,
}

impl ChildRestriction {
    fn allowed_display(&self) -> String {
        self.allowed.iter().map(SmolStr::as_str).collect::<Vec<_>>().join(", ")
    }
}

struct TagHelperRewriter<'a> {
    binder: &'a TagHelperBinder,
    tree: &'a RazorSyntaxTree,
    feature_flags: RazorParserFeatureFlags,
    diagnostics: Vec<RazorDiagnostic>,
    used_descriptors: Vec<Arc<TagHelperDescriptor>>,
    seen_descriptors: FxHashSet<(SmolStr, SmolStr)>,
}

impl TagHelperRewriter<'_> {
    fn error(&mut self, code: DiagnosticCode, start: SourceLocation, length: usize, args: &[&str]) {
        let span = self.tree.source().span(start, length);
        self.diagnostics.push(RazorDiagnostic::new(code, span, args));
    }

    fn rewrite_block(&mut self, block: &Arc<Block>, context: &ParentContext) -> SyntaxNode {
        let children = self.rewrite_list(block.children(), context);
        rebuild_if_changed(block, children)
    }

    fn rewrite_list(&mut self, children: &[SyntaxNode], context: &ParentContext) -> Vec<SyntaxNode> {
        let mut out = Vec::with_capacity(children.len());
        let mut open_elements: Vec<SmolStr> = Vec::new();
        let mut index = 0;
        while index < children.len() {
            let child = &children[index];
            index += 1;

            let direct_restriction = if open_elements.is_empty() {
                context.restriction.clone()
            } else {
                None
            };
            let nested = ParentContext {
                tag_name: open_elements.last().cloned().or_else(|| context.tag_name.clone()),
                is_tag_helper: open_elements.is_empty() && context.is_tag_helper,
                restriction: None,
            };

            let block = match child {
                SyntaxNode::Span(span) => {
                    if let Some(restriction) = &direct_restriction {
                        self.check_text_content(span, restriction);
                    }
                    out.push(child.clone());
                    continue;
                }
                SyntaxNode::Block(block) => block,
            };

            if block.kind == BlockKind::HtmlComment {
                if let Some(restriction) = &direct_restriction {
                    if !self.feature_flags.allow_html_comments_in_tag_helpers {
                        self.report_invalid_content(block.start(), block.length(), restriction);
                    }
                }
                out.push(child.clone());
                continue;
            }
            if block.kind != BlockKind::Tag || block.generator != BlockChunkGenerator::None {
                out.push(self.rewrite_block(block, &nested));
                continue;
            }

            let Some(head) = TagHead::read(block) else {
                out.push(child.clone());
                continue;
            };

            if head.is_end {
                match open_elements
                    .iter()
                    .rposition(|open| open.eq_ignore_ascii_case(&head.name))
                {
                    Some(position) => open_elements.truncate(position),
                    None => self.check_orphan_end_tag(&head, &nested),
                }
                out.push(child.clone());
                continue;
            }

            if let Some(restriction) = &direct_restriction {
                self.check_child_tag(&head, restriction);
            }

            let tag = StartTag::read(block);
            let pairs: Vec<(&str, &str)> = tag
                .attributes
                .iter()
                .map(|attribute| (attribute.name.as_str(), attribute.text.as_str()))
                .collect();
            let binding = self.binder.get_binding(
                &head.name,
                &pairs,
                nested.tag_name.as_deref(),
                nested.is_tag_helper,
            );

            let Some(binding) = binding else {
                if !head.self_closing && !is_void_element(&head.name) {
                    open_elements.push(head.name.clone());
                }
                out.push(self.rewrite_block(block, &nested));
                continue;
            };

            let (tag_mode, body_end, end_tag) = if head.self_closing {
                (TagMode::SelfClosing, index, None)
            } else if binding.tag_structure() == TagStructure::WithoutEndTag {
                (TagMode::StartTagOnly, index, None)
            } else {
                match find_end_tag(children, index, &head.name) {
                    Some(end) => (TagMode::StartTagAndEndTag, end, Some(end)),
                    None => {
                        self.error(
                            DiagnosticCode::TagHelperMissingCloseTag,
                            head.name_start,
                            head.name.len(),
                            &[head.name.as_str()],
                        );
                        (TagMode::StartTagAndEndTag, children.len(), None)
                    }
                }
            };

            if tag.has_code {
                self.error(
                    DiagnosticCode::TagHelpersCannotHaveCSharpInTagDeclaration,
                    head.name_start,
                    head.name.len(),
                    &[head.name.as_str()],
                );
            }

            for descriptor in binding.descriptors() {
                let key = (descriptor.assembly_name.clone(), descriptor.name.clone());
                if self.seen_descriptors.insert(key) {
                    self.used_descriptors.push(Arc::clone(descriptor));
                }
            }

            let attributes = self.bind_attributes(&head, tag.attributes, &binding);

            let body_context = ParentContext {
                tag_name: Some(head.name.clone()),
                is_tag_helper: true,
                restriction: child_restriction(&head.name, &binding, self.binder.prefix()),
            };
            let body = self.rewrite_list(&children[index..body_end], &body_context);

            let mut helper_children = Vec::with_capacity(body.len() + 2);
            helper_children.push(child.clone());
            helper_children.extend(body);
            if let Some(end) = end_tag {
                helper_children.push(children[end].clone());
            }
            index = end_tag.map_or(body_end, |end| end + 1);

            let info = TagHelperInfo {
                tag_name: head.name.clone(),
                tag_mode,
                binding,
                attributes,
            };
            let helper = Block::new(
                BlockKind::Tag,
                BlockChunkGenerator::TagHelper(Arc::new(info)),
                helper_children,
                block.start(),
            );
            out.push(helper.into());
        }
        out
    }

    /// An end tag with no open element. Tag helpers that must not have an
    /// end tag report it.
    fn check_orphan_end_tag(&mut self, head: &TagHead, context: &ParentContext) {
        let Some(binding) =
            self.binder
                .get_binding(&head.name, &[], context.tag_name.as_deref(), context.is_tag_helper)
        else {
            return;
        };
        if binding.tag_structure() != TagStructure::WithoutEndTag {
            return;
        }
        let display = binding
            .descriptors()
            .next()
            .map(|descriptor| descriptor.display_name.clone())
            .unwrap_or_default();
        self.error(
            DiagnosticCode::TagHelperMustNotHaveAnEndTag,
            head.name_start,
            head.name.len(),
            &[head.name.as_str(), display.as_str(), "WithoutEndTag"],
        );
    }

    fn check_child_tag(&mut self, head: &TagHead, restriction: &ChildRestriction) {
        let name = strip_prefix(&head.name, self.binder.prefix());
        if restriction.allowed.iter().any(|allowed| allowed.eq_ignore_ascii_case(name)) {
            return;
        }
        let allowed = restriction.allowed_display();
        self.error(
            DiagnosticCode::InvalidNestedTag,
            head.name_start,
            head.name.len(),
            &[head.name.as_str(), restriction.parent.as_str(), allowed.as_str()],
        );
    }

    fn check_text_content(&mut self, span: &Span, restriction: &ChildRestriction) {
        if span.kind != SpanKind::Markup {
            return;
        }
        let content = span.content();
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return;
        }
        let start = span.start().advance(&content[..content.len() - trimmed.len()]);
        let length = trimmed.trim_end().len();
        self.report_invalid_content(start, length, restriction);
    }

    fn report_invalid_content(&mut self, start: SourceLocation, length: usize, restriction: &ChildRestriction) {
        let allowed = restriction.allowed_display();
        self.error(
            DiagnosticCode::InvalidHtmlContentInTagHelper,
            start,
            length,
            &[restriction.parent.as_str(), allowed.as_str()],
        );
    }

    /// Pairs each attribute with the bound attributes it sets. Within one
    /// descriptor the first bound attribute that matches wins; every
    /// descriptor gets its own match.
    fn bind_attributes(
        &mut self,
        head: &TagHead,
        attributes: Vec<ParsedAttribute>,
        binding: &TagHelperBinding,
    ) -> Vec<TagHelperAttributeNode> {
        let mut reported = FxHashSet::default();
        let mut nodes = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let mut matches = Vec::new();
            for descriptor in binding.descriptors() {
                let Some((bound, is_indexer)) = conventions::get_attribute_matches(&attribute.name, descriptor).next()
                else {
                    continue;
                };
                let missing_key = is_indexer
                    && bound
                        .indexer_name_prefix
                        .as_deref()
                        .is_some_and(|prefix| prefix.len() == attribute.name.len());
                if missing_key {
                    let code = DiagnosticCode::TagHelperIndexerAttributeNameMustIncludeKey;
                    if reported.insert((attribute.name.clone(), code)) {
                        self.error(
                            code,
                            attribute.name_start,
                            attribute.name.len(),
                            &[attribute.name.as_str(), head.name.as_str()],
                        );
                    }
                    continue;
                }

                let is_string = if is_indexer {
                    bound.is_indexer_string_property()
                } else {
                    bound.is_string_property()
                };
                let is_boolean = if is_indexer {
                    bound.is_indexer_boolean_property()
                } else {
                    bound.is_boolean_property()
                };
                let empty = match &attribute.value {
                    None => !(is_boolean && self.feature_flags.allow_minimized_boolean_tag_helper_attributes),
                    Some(value) => !is_string && value.content().trim().is_empty(),
                };
                if empty && reported.insert((attribute.name.clone(), DiagnosticCode::EmptyBoundAttribute)) {
                    let type_name = if is_indexer {
                        bound.indexer_type_name.clone().unwrap_or_default()
                    } else {
                        bound.type_name.clone()
                    };
                    self.error(
                        DiagnosticCode::EmptyBoundAttribute,
                        attribute.name_start,
                        attribute.name.len(),
                        &[attribute.name.as_str(), head.name.as_str(), type_name.as_str()],
                    );
                }

                matches.push(BoundAttributeMatch {
                    descriptor: Arc::clone(descriptor),
                    attribute: bound.clone(),
                    is_indexer,
                });
            }
            nodes.push(TagHelperAttributeNode {
                name: attribute.name,
                value: attribute.value,
                value_style: attribute.style,
                matches,
            });
        }
        nodes
    }
}

fn child_restriction(
    tag_name: &str,
    binding: &TagHelperBinding,
    prefix: Option<&str>,
) -> Option<Arc<ChildRestriction>> {
    let mut allowed: Vec<SmolStr> = Vec::new();
    let mut restricts = false;
    for descriptor in binding.descriptors() {
        if !descriptor.restricts_children() {
            continue;
        }
        restricts = true;
        for child in &descriptor.allowed_child_tags {
            if !allowed.iter().any(|name| name.eq_ignore_ascii_case(&child.name)) {
                allowed.push(child.name.clone());
            }
        }
    }
    restricts.then(|| {
        Arc::new(ChildRestriction {
            parent: SmolStr::new(strip_prefix(tag_name, prefix)),
            allowed,
        })
    })
}

fn strip_prefix<'n>(name: &'n str, prefix: Option<&str>) -> &'n str {
    match prefix {
        Some(prefix) => name
            .get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .and_then(|_| name.get(prefix.len()..))
            .unwrap_or(name),
        None => name,
    }
}

/// Index of the end tag closing the element named `name`, searching the
/// siblings from `from` on. Nested elements of the same name are skipped.
fn find_end_tag(children: &[SyntaxNode], from: usize, name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, child) in children.iter().enumerate().skip(from) {
        let Some(block) = child.as_block() else {
            continue;
        };
        if block.kind != BlockKind::Tag || block.generator != BlockChunkGenerator::None {
            continue;
        }
        let Some(head) = TagHead::read(block) else {
            continue;
        };
        if !head.name.eq_ignore_ascii_case(name) {
            continue;
        }
        if head.is_end {
            if depth == 0 {
                return Some(index);
            }
            depth -= 1;
        } else if !head.self_closing {
            depth += 1;
        }
    }
    None
}

/// Name and shape of a tag block.
#[derive(Debug)]
struct TagHead {
    name: SmolStr,
    name_start: SourceLocation,
    is_end: bool,
    self_closing: bool,
}

impl TagHead {
    fn read(block: &Block) -> Option<TagHead> {
        let content = block.content();
        let rest = content.strip_prefix('<')?;
        let (is_end, rest) = match rest.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let name_len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '<' | '@' | '"' | '\'' | '='))
            .unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let name = SmolStr::new(&rest[..name_len]);
        let name_start = block.start().advance(if is_end { "</" } else { "<" });
        let self_closing = !is_end && content.trim_end().ends_with("/>");
        Some(TagHead {
            name,
            name_start,
            is_end,
            self_closing,
        })
    }
}

/// An attribute read off a start tag.
#[derive(Debug)]
struct ParsedAttribute {
    name: SmolStr,
    name_start: SourceLocation,
    /// `None` when minimized.
    value: Option<SyntaxNode>,
    style: AttributeValueStyle,
    /// The value text, code included, for required attribute matching.
    text: String,
}

/// The attributes of a start tag and whether code appears outside of them.
#[derive(Debug)]
struct StartTag {
    attributes: Vec<ParsedAttribute>,
    has_code: bool,
}

/// A start tag flattened to markup tokens and opaque nodes.
enum Piece<'t> {
    Token(&'t SyntaxToken),
    Node(&'t SyntaxNode),
}

impl Piece<'_> {
    fn is_html(&self, kind: HtmlTokenKind) -> bool {
        matches!(self, Piece::Token(token) if token.is_html(kind))
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Piece::Token(token) if token.kind.is_whitespace())
    }
}

impl StartTag {
    fn read(block: &Block) -> StartTag {
        let mut pieces = Vec::new();
        for child in block.children() {
            match child {
                SyntaxNode::Span(span) => pieces.extend(span.tokens.iter().map(Piece::Token)),
                SyntaxNode::Block(_) => pieces.push(Piece::Node(child)),
            }
        }

        let mut attributes = Vec::new();
        let mut has_code = false;
        // `<` and the tag name.
        let mut index = 1;
        while index < pieces.len() && pieces[index].is_html(HtmlTokenKind::Text) {
            index += 1;
        }

        while index < pieces.len() {
            match &pieces[index] {
                Piece::Node(node) => {
                    if let Some(attribute) = node.as_block().and_then(|block| from_attribute_block(block)) {
                        attributes.push(attribute);
                    } else if !node.is_block_of(BlockKind::Comment) {
                        has_code = true;
                    }
                    index += 1;
                }
                Piece::Token(token) if token.is_html(HtmlTokenKind::CloseAngle) => break,
                Piece::Token(token) if token.is_html(HtmlTokenKind::Text) => {
                    let (attribute, next) = read_attribute(&pieces, index);
                    attributes.push(attribute);
                    index = next;
                }
                Piece::Token(_) => index += 1,
            }
        }
        StartTag { attributes, has_code }
    }
}

/// Reads a plain (non-block) attribute starting at the name token at
/// `start`. Returns the attribute and the index after it.
fn read_attribute(pieces: &[Piece<'_>], start: usize) -> (ParsedAttribute, usize) {
    let mut index = start;
    let mut name = String::new();
    let mut name_start = SourceLocation::ZERO;
    while let Some(Piece::Token(token)) = pieces.get(index) {
        if !token.is_html(HtmlTokenKind::Text) {
            break;
        }
        if name.is_empty() {
            name_start = token.start;
        }
        name.push_str(&token.content);
        index += 1;
    }
    let name_end = name_start.advance(&name);

    let mut after_name = index;
    while pieces.get(after_name).is_some_and(Piece::is_whitespace) {
        after_name += 1;
    }
    if !pieces.get(after_name).is_some_and(|piece| piece.is_html(HtmlTokenKind::Equals)) {
        let attribute = ParsedAttribute {
            name: name.into(),
            name_start,
            value: None,
            style: AttributeValueStyle::Minimized,
            text: String::new(),
        };
        return (attribute, index);
    }

    index = after_name + 1;
    while pieces.get(index).is_some_and(Piece::is_whitespace) {
        index += 1;
    }
    let quote = match pieces.get(index) {
        Some(Piece::Token(token)) if token.is_html(HtmlTokenKind::DoubleQuote) => Some(HtmlTokenKind::DoubleQuote),
        Some(Piece::Token(token)) if token.is_html(HtmlTokenKind::SingleQuote) => Some(HtmlTokenKind::SingleQuote),
        _ => None,
    };
    let value_location = match pieces.get(index) {
        Some(Piece::Token(token)) if quote.is_some() => token.end(),
        Some(Piece::Token(token)) => token.start,
        Some(Piece::Node(node)) => node.start(),
        None => name_end,
    };
    if quote.is_some() {
        index += 1;
    }

    let value_start = index;
    while let Some(piece) = pieces.get(index) {
        let ends = match quote {
            Some(quote) => piece.is_html(quote),
            None => {
                piece.is_whitespace()
                    || piece.is_html(HtmlTokenKind::CloseAngle)
                    || (piece.is_html(HtmlTokenKind::ForwardSlash)
                        && pieces
                            .get(index + 1)
                            .is_some_and(|next| next.is_html(HtmlTokenKind::CloseAngle)))
            }
        };
        if ends {
            break;
        }
        index += 1;
    }
    let value_pieces = &pieces[value_start..index];
    if quote.is_some() && index < pieces.len() {
        index += 1;
    }

    let style = match quote {
        Some(HtmlTokenKind::DoubleQuote) => AttributeValueStyle::DoubleQuotes,
        Some(_) => AttributeValueStyle::SingleQuotes,
        None => AttributeValueStyle::NoQuotes,
    };
    let text = value_pieces
        .iter()
        .map(|piece| match piece {
            Piece::Token(token) => token.content.to_string(),
            Piece::Node(node) => node.content(),
        })
        .collect();
    let attribute = ParsedAttribute {
        name: name.into(),
        name_start,
        value: Some(value_node(value_pieces, value_location)),
        style,
        text,
    };
    (attribute, index)
}

/// Groups runs of tokens into markup spans; a single run becomes the value
/// itself.
fn value_node(pieces: &[Piece<'_>], location: SourceLocation) -> SyntaxNode {
    let mut children: Vec<SyntaxNode> = Vec::new();
    let mut run: Vec<SyntaxToken> = Vec::new();
    let flush = |run: &mut Vec<SyntaxToken>, children: &mut Vec<SyntaxNode>| {
        if !run.is_empty() {
            let tokens = std::mem::take(run);
            let start = tokens[0].start;
            children.push(
                Span::new(
                    SpanKind::Markup,
                    tokens,
                    start,
                    SpanChunkGenerator::Markup,
                    AcceptedCharacters::Any,
                )
                .into(),
            );
        }
    };
    for piece in pieces {
        match piece {
            Piece::Token(token) => run.push((*token).clone()),
            Piece::Node(node) => {
                flush(&mut run, &mut children);
                children.push((*node).clone());
            }
        }
    }
    flush(&mut run, &mut children);

    match children.len() {
        0 => Span::new(
            SpanKind::Markup,
            Vec::new(),
            location,
            SpanChunkGenerator::Markup,
            AcceptedCharacters::Any,
        )
        .into(),
        1 if children[0].as_span().is_some() => children.remove(0),
        _ => Block::new(BlockKind::Markup, BlockChunkGenerator::None, children, location).into(),
    }
}

/// Reads a conditional attribute block: prefix span, value segments and,
/// when quoted, a suffix span.
fn from_attribute_block(block: &Block) -> Option<ParsedAttribute> {
    let BlockChunkGenerator::Attribute { name, prefix, suffix } = &block.generator else {
        return None;
    };
    let children = block.children();
    let value_end = if suffix.value.is_empty() {
        children.len()
    } else {
        children.len().saturating_sub(1)
    };
    let values = children.get(1..value_end).unwrap_or_default();
    let style = match prefix.value.chars().next_back() {
        Some('"') => AttributeValueStyle::DoubleQuotes,
        Some('\'') => AttributeValueStyle::SingleQuotes,
        _ => AttributeValueStyle::NoQuotes,
    };
    let value_location = prefix.location.advance(&prefix.value);
    let value = match values {
        [] => Span::new(
            SpanKind::Markup,
            Vec::new(),
            value_location,
            SpanChunkGenerator::Markup,
            AcceptedCharacters::Any,
        )
        .into(),
        [single] => single.clone(),
        _ => Block::new(BlockKind::Markup, BlockChunkGenerator::None, values.to_vec(), value_location).into(),
    };
    let leading = prefix.value.len() - prefix.value.trim_start().len();
    Some(ParsedAttribute {
        name: name.clone(),
        name_start: prefix.location.advance(&prefix.value[..leading]),
        text: value.content(),
        value: Some(value),
        style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix_ignores_case() {
        assert_eq!(strip_prefix("th:input", Some("TH:")), "input");
        assert_eq!(strip_prefix("input", Some("th:")), "input");
        assert_eq!(strip_prefix("input", None), "input");
    }
}
