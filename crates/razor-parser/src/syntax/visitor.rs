//! Read-only visitors and structure-sharing rewriters.

use super::node::{Block, Span, SyntaxNode};
use std::sync::Arc;

/// Walks a tree. Override the hooks you need and call [`walk_block`] to
/// keep descending.
pub trait SyntaxVisitor {
    fn visit_span(&mut self, _span: &Arc<Span>) {}

    fn visit_block(&mut self, block: &Arc<Block>) {
        walk_block(self, block);
    }
}

pub fn walk_node<V: SyntaxVisitor + ?Sized>(visitor: &mut V, node: &SyntaxNode) {
    match node {
        SyntaxNode::Span(span) => visitor.visit_span(span),
        SyntaxNode::Block(block) => visitor.visit_block(block),
    }
}

pub fn walk_block<V: SyntaxVisitor + ?Sized>(visitor: &mut V, block: &Arc<Block>) {
    for child in block.children() {
        walk_node(visitor, child);
    }
}

/// Produces a new tree from an old one.
///
/// The default hooks return their input unchanged. A block whose children
/// all come back pointer-equal is itself returned as is, so only the path
/// from the root to a changed node is reallocated.
pub trait SyntaxRewriter {
    fn rewrite_span(&mut self, span: &Arc<Span>) -> SyntaxNode {
        SyntaxNode::Span(Arc::clone(span))
    }

    fn rewrite_block(&mut self, block: &Arc<Block>) -> SyntaxNode {
        rewrite_children(self, block)
    }
}

pub fn rewrite_node<R: SyntaxRewriter + ?Sized>(rewriter: &mut R, node: &SyntaxNode) -> SyntaxNode {
    match node {
        SyntaxNode::Span(span) => rewriter.rewrite_span(span),
        SyntaxNode::Block(block) => rewriter.rewrite_block(block),
    }
}

/// Rewrites each child and rebuilds `block` only if one of them changed.
pub fn rewrite_children<R: SyntaxRewriter + ?Sized>(rewriter: &mut R, block: &Arc<Block>) -> SyntaxNode {
    let children = rewrite_child_list(rewriter, block);
    rebuild_if_changed(block, children)
}

pub fn rewrite_child_list<R: SyntaxRewriter + ?Sized>(rewriter: &mut R, block: &Arc<Block>) -> Vec<SyntaxNode> {
    block
        .children()
        .iter()
        .map(|child| rewrite_node(rewriter, child))
        .collect()
}

/// Returns `block` itself when `children` are the same handles it already
/// holds, otherwise a copy holding `children`.
pub fn rebuild_if_changed(block: &Arc<Block>, children: Vec<SyntaxNode>) -> SyntaxNode {
    let unchanged = children.len() == block.children().len()
        && children
            .iter()
            .zip(block.children())
            .all(|(new, old)| new.ptr_eq(old));
    if unchanged {
        SyntaxNode::Block(Arc::clone(block))
    } else {
        SyntaxNode::Block(Arc::new(block.with_children(children)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AcceptedCharacters, BlockChunkGenerator, BlockKind, SpanChunkGenerator, SpanKind};
    use crate::tokenizer::{HtmlTokenKind, SyntaxToken, TokenKind};
    use source_map::SourceLocation;

    fn span(text: &str, at: usize) -> SyntaxNode {
        let start = SourceLocation::new(at, 0, at);
        Span::new(
            SpanKind::Markup,
            vec![SyntaxToken::new(TokenKind::Html(HtmlTokenKind::Text), text, start)],
            start,
            SpanChunkGenerator::Markup,
            AcceptedCharacters::Any,
        )
        .into()
    }

    fn tree() -> SyntaxNode {
        let left = Block::new(BlockKind::Tag, BlockChunkGenerator::None, vec![span("a", 0)], SourceLocation::ZERO);
        let right = Block::new(
            BlockKind::Tag,
            BlockChunkGenerator::None,
            vec![span("b", 1)],
            SourceLocation::new(1, 0, 1),
        );
        Block::new(
            BlockKind::Markup,
            BlockChunkGenerator::None,
            vec![left.into(), right.into()],
            SourceLocation::ZERO,
        )
        .into()
    }

    struct Uppercase;

    impl SyntaxRewriter for Uppercase {
        fn rewrite_span(&mut self, span: &Arc<Span>) -> SyntaxNode {
            if span.content() == "b" {
                let mut tokens = span.tokens.clone();
                tokens[0].content = "B".into();
                Span::new(span.kind, tokens, span.start(), span.generator.clone(), span.accepted).into()
            } else {
                SyntaxNode::Span(Arc::clone(span))
            }
        }
    }

    #[test]
    fn test_rewriter_shares_untouched_subtrees() {
        let before = tree();
        let after = rewrite_node(&mut Uppercase, &before);
        assert_eq!(after.content(), "aB");
        assert!(!after.ptr_eq(&before));

        let old_children = before.as_block().unwrap().children();
        let new_children = after.as_block().unwrap().children();
        assert!(new_children[0].ptr_eq(&old_children[0]));
        assert!(!new_children[1].ptr_eq(&old_children[1]));
    }

    #[test]
    fn test_identity_rewrite_returns_same_root() {
        struct Identity;
        impl SyntaxRewriter for Identity {}

        let before = tree();
        let after = rewrite_node(&mut Identity, &before);
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn test_visitor_sees_spans_in_order() {
        struct Collect(Vec<String>);
        impl SyntaxVisitor for Collect {
            fn visit_span(&mut self, span: &Arc<Span>) {
                self.0.push(span.content().to_string());
            }
        }

        let mut collect = Collect(Vec::new());
        walk_node(&mut collect, &tree());
        assert_eq!(collect.0, vec!["a", "b"]);
    }
}
