use crate::tag_helpers::TagHelperDocumentContext;
use razor_diagnostics::{RazorDiagnostic, Severity};
use razor_ir::{IntermediateNode, NodeKind};
use razor_parser::{RazorSourceDocument, RazorSyntaxTree};
use smol_str::SmolStr;

/// Everything the engine produced for one document.
#[derive(Debug, Clone)]
pub struct RazorCodeDocument {
    pub(crate) source: RazorSourceDocument,
    pub(crate) imports: Vec<RazorSourceDocument>,
    pub(crate) syntax_tree: RazorSyntaxTree,
    pub(crate) import_syntax_trees: Vec<RazorSyntaxTree>,
    pub(crate) tag_helper_context: TagHelperDocumentContext,
    pub(crate) import_diagnostics: Vec<RazorDiagnostic>,
    pub(crate) document_node: IntermediateNode,
}

impl RazorCodeDocument {
    pub fn source(&self) -> &RazorSourceDocument {
        &self.source
    }

    pub fn imports(&self) -> &[RazorSourceDocument] {
        &self.imports
    }

    /// The document tree after every syntax tree pass.
    pub fn syntax_tree(&self) -> &RazorSyntaxTree {
        &self.syntax_tree
    }

    pub fn import_syntax_trees(&self) -> &[RazorSyntaxTree] {
        &self.import_syntax_trees
    }

    pub fn tag_helper_context(&self) -> &TagHelperDocumentContext {
        &self.tag_helper_context
    }

    pub fn document_node(&self) -> &IntermediateNode {
        &self.document_node
    }

    pub fn document_kind(&self) -> Option<&str> {
        self.document_node.document_kind()
    }

    pub fn class_name(&self) -> Option<SmolStr> {
        self.document_node
            .descendants()
            .find_map(|node| match &node.kind {
                NodeKind::ClassDeclaration { class_name, .. } => Some(class_name.clone()),
                _ => None,
            })
    }

    /// Diagnostics of the imports followed by those of the document, each
    /// group ordered by position.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut diagnostics = Vec::new();
        for tree in &self.import_syntax_trees {
            diagnostics.extend(tree.all_diagnostics());
        }
        diagnostics.extend(self.import_diagnostics.iter().cloned());
        diagnostics.extend(self.syntax_tree.all_diagnostics());
        diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}
