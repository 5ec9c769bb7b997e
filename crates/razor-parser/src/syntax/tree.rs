use super::node::{Block, SyntaxNode};
use crate::options::RazorParserOptions;
use crate::source::RazorSourceDocument;
use razor_diagnostics::RazorDiagnostic;
use std::sync::Arc;

/// The result of parsing one document.
///
/// Rewrite passes produce new trees with [`RazorSyntaxTree::with_root`];
/// the source and options travel along unchanged.
#[derive(Debug, Clone)]
pub struct RazorSyntaxTree {
    root: Arc<Block>,
    diagnostics: Vec<RazorDiagnostic>,
    options: Arc<RazorParserOptions>,
    source: RazorSourceDocument,
}

impl RazorSyntaxTree {
    pub fn new(
        root: Arc<Block>,
        diagnostics: Vec<RazorDiagnostic>,
        options: Arc<RazorParserOptions>,
        source: RazorSourceDocument,
    ) -> Self {
        Self {
            root,
            diagnostics,
            options,
            source,
        }
    }

    /// The root markup block.
    pub fn root(&self) -> &Arc<Block> {
        &self.root
    }

    pub fn root_node(&self) -> SyntaxNode {
        SyntaxNode::Block(Arc::clone(&self.root))
    }

    /// Diagnostics not attached to any node.
    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    pub fn options(&self) -> &RazorParserOptions {
        &self.options
    }

    pub fn source(&self) -> &RazorSourceDocument {
        &self.source
    }

    /// A tree with a new root and `extra` appended to the tree diagnostics.
    pub fn with_root(&self, root: Arc<Block>, extra: Vec<RazorDiagnostic>) -> RazorSyntaxTree {
        let mut diagnostics = self.diagnostics.clone();
        diagnostics.extend(extra);
        RazorSyntaxTree {
            root,
            diagnostics,
            options: Arc::clone(&self.options),
            source: self.source.clone(),
        }
    }

    /// Tree diagnostics and the diagnostics of every block, ordered by
    /// position. Diagnostics at the same position keep their relative order.
    pub fn all_diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut all = self.diagnostics.clone();
        for node in self.root_node().descendants() {
            if let SyntaxNode::Block(block) = node {
                all.extend(block.diagnostics.iter().cloned());
            }
        }
        all.sort_by_key(|diagnostic| diagnostic.span.absolute_index);
        all
    }
}
