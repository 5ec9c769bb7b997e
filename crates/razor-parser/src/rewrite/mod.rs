//! Passes that run over a parsed tree and return a new one.
//!
//! The first two run as part of [`crate::parse`]. Tag helper rewriting needs
//! the effective descriptor set, which only the directive pass knows, so the
//! engine runs it separately.

mod attributes;
mod tag_helpers;
mod whitespace;

pub use attributes::ConditionalAttributeCollapser;
pub use tag_helpers::rewrite_tag_helpers;
pub use whitespace::WhitespaceRewriter;

use crate::syntax::{rewrite_node, RazorSyntaxTree, SyntaxNode, SyntaxRewriter};
use std::sync::Arc;

/// Runs `rewriter` over the whole tree.
pub fn apply<R: SyntaxRewriter + ?Sized>(tree: &RazorSyntaxTree, rewriter: &mut R) -> RazorSyntaxTree {
    match rewrite_node(rewriter, &tree.root_node()) {
        SyntaxNode::Block(root) => tree.with_root(root, Vec::new()),
        SyntaxNode::Span(_) => tree.with_root(Arc::clone(tree.root()), Vec::new()),
    }
}

/// The rewriters every parse goes through.
pub fn apply_default_rewriters(tree: &RazorSyntaxTree) -> RazorSyntaxTree {
    let tree = apply(tree, &mut WhitespaceRewriter);
    apply(&tree, &mut ConditionalAttributeCollapser)
}
