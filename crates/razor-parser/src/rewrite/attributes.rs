use crate::syntax::{
    rewrite_children, AcceptedCharacters, Block, BlockChunkGenerator, Span, SpanChunkGenerator, SpanKind,
    SyntaxNode, SyntaxRewriter,
};
use std::sync::Arc;

/// Turns conditional attributes whose value has no code into plain markup.
///
/// Only attributes with a dynamic segment need to be rendered conditionally;
/// the rest are collapsed into one markup span holding the whole attribute.
#[derive(Debug, Default)]
pub struct ConditionalAttributeCollapser;

impl SyntaxRewriter for ConditionalAttributeCollapser {
    fn rewrite_block(&mut self, block: &Arc<Block>) -> SyntaxNode {
        if is_literal_attribute(block) {
            let tokens = block
                .children()
                .iter()
                .filter_map(SyntaxNode::as_span)
                .flat_map(|span| span.tokens.iter().cloned())
                .collect();
            let span = Span::new(
                SpanKind::Markup,
                tokens,
                block.start(),
                SpanChunkGenerator::Markup,
                AcceptedCharacters::Any,
            );
            return span.into();
        }
        rewrite_children(self, block)
    }
}

/// An attribute block made only of markup spans. An escaped `@@` leaves a
/// span that renders nothing inside the value, which keeps the block as is.
fn is_literal_attribute(block: &Block) -> bool {
    if !matches!(block.generator, BlockChunkGenerator::Attribute { .. }) {
        return false;
    }
    let children = block.children();
    let all_markup = children
        .iter()
        .all(|child| child.as_span().is_some_and(|span| span.kind == SpanKind::Markup));
    let has_escape = children
        .iter()
        .skip(1)
        .filter_map(SyntaxNode::as_span)
        .any(|span| span.generator == SpanChunkGenerator::None && span.content() == "@");
    all_markup && !has_escape
}
