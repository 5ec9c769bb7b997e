use crate::syntax::{
    rebuild_if_changed, rewrite_node, AcceptedCharacters, Block, BlockKind, Span, SpanChunkGenerator, SpanKind,
    SyntaxNode, SyntaxRewriter,
};
use std::sync::Arc;

/// Moves whitespace that an expression block took from the start of its
/// line out in front of the block, as markup.
///
/// Statement and directive blocks keep their leading whitespace.
#[derive(Debug, Default)]
pub struct WhitespaceRewriter;

impl SyntaxRewriter for WhitespaceRewriter {
    fn rewrite_block(&mut self, block: &Arc<Block>) -> SyntaxNode {
        let mut children = Vec::with_capacity(block.children().len());
        for child in block.children() {
            let child = rewrite_node(self, child);
            match split_leading_whitespace(&child) {
                Some((whitespace, rest)) => {
                    children.push(whitespace);
                    children.push(rest);
                }
                None => children.push(child),
            }
        }
        rebuild_if_changed(block, children)
    }
}

fn split_leading_whitespace(node: &SyntaxNode) -> Option<(SyntaxNode, SyntaxNode)> {
    let block = node.as_block()?;
    if block.kind != BlockKind::Expression || block.children().len() < 2 {
        return None;
    }
    let first = block.children().first()?.as_span()?;
    let content = first.content();
    if first.kind != SpanKind::Code || content.is_empty() || !content.chars().all(char::is_whitespace) {
        return None;
    }
    let whitespace = Span::new(
        SpanKind::Markup,
        first.tokens.clone(),
        first.start(),
        SpanChunkGenerator::Markup,
        AcceptedCharacters::Any,
    );
    let rest = block.with_children(block.children()[1..].to_vec());
    Some((whitespace.into(), rest.into()))
}
