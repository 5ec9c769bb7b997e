//! Spans, blocks and the node handle that unifies them.

use super::generator::{BlockChunkGenerator, SpanChunkGenerator};
use crate::tokenizer::SyntaxToken;
use razor_diagnostics::RazorDiagnostic;
use source_map::SourceLocation;
use std::fmt;
use std::sync::Arc;

/// What role the text of a span plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// The `@` that switches language.
    Transition,
    /// Razor syntax that is neither markup nor code: braces, parens, directive names.
    MetaCode,
    Comment,
    Code,
    Markup,
    None,
}

/// How much text an editor may add after a span without reparsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AcceptedCharacters {
    None,
    NewLine,
    WhiteSpace,
    NonWhiteSpace,
    AllWhiteSpace,
    AnyExceptNewline,
    #[default]
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Markup,
    Statement,
    Expression,
    Directive,
    Comment,
    Template,
    Tag,
    HtmlComment,
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A leaf: a run of tokens with a kind and a chunk generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub accepted: AcceptedCharacters,
    pub generator: SpanChunkGenerator,
    pub tokens: Vec<SyntaxToken>,
    start: SourceLocation,
    content: String,
}

impl Span {
    /// Creates a span. `start` is only used when `tokens` is empty.
    pub fn new(
        kind: SpanKind,
        tokens: Vec<SyntaxToken>,
        start: SourceLocation,
        generator: SpanChunkGenerator,
        accepted: AcceptedCharacters,
    ) -> Self {
        let start = tokens.first().map_or(start, |token| token.start);
        let content = tokens.iter().map(|token| token.content.as_str()).collect();
        Self {
            kind,
            accepted,
            generator,
            tokens,
            start,
            content,
        }
    }

    pub fn start(&self) -> SourceLocation {
        self.start
    }

    pub fn length(&self) -> usize {
        self.content.len()
    }

    pub fn end(&self) -> SourceLocation {
        self.start.advance(&self.content)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// A copy with a different generator.
    pub fn with_generator(&self, generator: SpanChunkGenerator) -> Span {
        Span {
            generator,
            ..self.clone()
        }
    }

    /// A copy with a different kind, generator and accepted characters.
    pub fn rekind(&self, kind: SpanKind, generator: SpanChunkGenerator, accepted: AcceptedCharacters) -> Span {
        Span {
            kind,
            generator,
            accepted,
            ..self.clone()
        }
    }
}

/// A container of spans and nested blocks.
///
/// The length is always the sum of the children's lengths; it is computed
/// at construction and children cannot be changed in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub generator: BlockChunkGenerator,
    pub diagnostics: Vec<RazorDiagnostic>,
    children: Vec<SyntaxNode>,
    start: SourceLocation,
    length: usize,
}

impl Block {
    /// Creates a block. `start` is only used when `children` is empty.
    pub fn new(
        kind: BlockKind,
        generator: BlockChunkGenerator,
        children: Vec<SyntaxNode>,
        start: SourceLocation,
    ) -> Self {
        let start = children.first().map_or(start, SyntaxNode::start);
        let length = children.iter().map(SyntaxNode::length).sum();
        Self {
            kind,
            generator,
            diagnostics: Vec::new(),
            children,
            start,
            length,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<RazorDiagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// A copy with the same kind, generator and diagnostics but new children.
    pub fn with_children(&self, children: Vec<SyntaxNode>) -> Block {
        Block::new(self.kind, self.generator.clone(), children, self.start)
            .with_diagnostics(self.diagnostics.clone())
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    pub fn start(&self) -> SourceLocation {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn content(&self) -> String {
        let mut content = String::with_capacity(self.length);
        for child in &self.children {
            child.write_content(&mut content);
        }
        content
    }

    /// All spans below this block in document order.
    pub fn flatten(&self) -> Vec<Arc<Span>> {
        let mut spans = Vec::new();
        for child in &self.children {
            child.collect_spans(&mut spans);
        }
        spans
    }
}

/// A shared handle to a span or block.
///
/// Cloning is cheap. Rewriters return the same handle for untouched
/// subtrees, so unchanged parts of a tree stay shared between versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Span(Arc<Span>),
    Block(Arc<Block>),
}

impl SyntaxNode {
    pub fn start(&self) -> SourceLocation {
        match self {
            SyntaxNode::Span(span) => span.start(),
            SyntaxNode::Block(block) => block.start(),
        }
    }

    pub fn length(&self) -> usize {
        match self {
            SyntaxNode::Span(span) => span.length(),
            SyntaxNode::Block(block) => block.length(),
        }
    }

    pub fn end_index(&self) -> usize {
        self.start().absolute_index + self.length()
    }

    pub fn content(&self) -> String {
        let mut content = String::with_capacity(self.length());
        self.write_content(&mut content);
        content
    }

    fn write_content(&self, out: &mut String) {
        match self {
            SyntaxNode::Span(span) => out.push_str(span.content()),
            SyntaxNode::Block(block) => {
                for child in block.children() {
                    child.write_content(out);
                }
            }
        }
    }

    fn collect_spans(&self, out: &mut Vec<Arc<Span>>) {
        match self {
            SyntaxNode::Span(span) => out.push(Arc::clone(span)),
            SyntaxNode::Block(block) => {
                for child in block.children() {
                    child.collect_spans(out);
                }
            }
        }
    }

    pub fn as_span(&self) -> Option<&Arc<Span>> {
        match self {
            SyntaxNode::Span(span) => Some(span),
            SyntaxNode::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Arc<Block>> {
        match self {
            SyntaxNode::Block(block) => Some(block),
            SyntaxNode::Span(_) => None,
        }
    }

    pub fn is_block_of(&self, kind: BlockKind) -> bool {
        self.as_block().is_some_and(|block| block.kind == kind)
    }

    pub fn is_span_of(&self, kind: SpanKind) -> bool {
        self.as_span().is_some_and(|span| span.kind == kind)
    }

    /// True if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &SyntaxNode) -> bool {
        match (self, other) {
            (SyntaxNode::Span(a), SyntaxNode::Span(b)) => Arc::ptr_eq(a, b),
            (SyntaxNode::Block(a), SyntaxNode::Block(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Pre-order traversal including `self`.
    pub fn descendants(&self) -> Descendants {
        Descendants {
            stack: vec![self.clone()],
        }
    }
}

impl From<Span> for SyntaxNode {
    fn from(span: Span) -> Self {
        SyntaxNode::Span(Arc::new(span))
    }
}

impl From<Block> for SyntaxNode {
    fn from(block: Block) -> Self {
        SyntaxNode::Block(Arc::new(block))
    }
}

pub struct Descendants {
    stack: Vec<SyntaxNode>,
}

impl Iterator for Descendants {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        let node = self.stack.pop()?;
        if let SyntaxNode::Block(block) = &node {
            self.stack.extend(block.children().iter().rev().cloned());
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{HtmlTokenKind, TokenKind};

    fn markup(text: &str, start: SourceLocation) -> SyntaxNode {
        let token = SyntaxToken::new(TokenKind::Html(HtmlTokenKind::Text), text, start);
        Span::new(
            SpanKind::Markup,
            vec![token],
            start,
            SpanChunkGenerator::Markup,
            AcceptedCharacters::Any,
        )
        .into()
    }

    #[test]
    fn test_block_length_is_sum_of_children() {
        let a = markup("ab", SourceLocation::ZERO);
        let b = markup("cde", SourceLocation::new(2, 0, 2));
        let block = Block::new(
            BlockKind::Markup,
            BlockChunkGenerator::None,
            vec![a, b],
            SourceLocation::new(99, 0, 0),
        );
        assert_eq!(block.length(), 5);
        assert_eq!(block.start(), SourceLocation::ZERO);
        assert_eq!(block.content(), "abcde");
    }

    #[test]
    fn test_empty_nodes_keep_explicit_start() {
        let at = SourceLocation::new(4, 1, 0);
        let span = Span::new(
            SpanKind::Code,
            Vec::new(),
            at,
            SpanChunkGenerator::Expression,
            AcceptedCharacters::NonWhiteSpace,
        );
        assert_eq!(span.start(), at);
        assert_eq!(span.length(), 0);
        let block = Block::new(BlockKind::Expression, BlockChunkGenerator::Expression, Vec::new(), at);
        assert_eq!(block.start(), at);
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let inner = Block::new(
            BlockKind::Tag,
            BlockChunkGenerator::None,
            vec![markup("<p>", SourceLocation::ZERO)],
            SourceLocation::ZERO,
        );
        let root: SyntaxNode = Block::new(
            BlockKind::Markup,
            BlockChunkGenerator::None,
            vec![inner.into(), markup("x", SourceLocation::new(3, 0, 3))],
            SourceLocation::ZERO,
        )
        .into();
        let contents: Vec<_> = root.descendants().map(|node| node.content()).collect();
        assert_eq!(contents, vec!["<p>x", "<p>", "<p>", "x"]);
    }
}
