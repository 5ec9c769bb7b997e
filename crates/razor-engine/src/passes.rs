//! Passes over the syntax tree, run after parsing and before lowering.

use crate::tag_helpers::{resolve_tag_helpers, TagHelperDocumentContext};
use log::{debug, trace};
use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
use razor_parser::directives::SECTION_DIRECTIVE;
use razor_parser::rewrite::{self, rewrite_tag_helpers};
use razor_parser::syntax::{rewrite_children, Block, BlockKind, SpanKind, SyntaxNode, SyntaxRewriter};
use razor_parser::{RazorSourceDocument, RazorSyntaxTree};
use razor_tag_helpers::TagHelperDescriptor;
use std::sync::Arc;

pub const DEFAULT_SYNTAX_TREE_PASS_ORDER: i32 = 0;

/// Binding runs after every pass registered with a default order.
pub const TAG_HELPER_BINDING_ORDER: i32 = 1000;

/// Shared state for the syntax tree passes of one document.
#[derive(Debug)]
pub struct SyntaxTreePassContext<'a> {
    pub imports: &'a [RazorSyntaxTree],
    pub tag_helpers: &'a [Arc<TagHelperDescriptor>],
    /// Set by [`TagHelperBinderPass`].
    pub tag_helper_context: Option<TagHelperDocumentContext>,
    /// Problems found in the imports rather than in the document.
    pub import_diagnostics: Vec<RazorDiagnostic>,
}

impl<'a> SyntaxTreePassContext<'a> {
    pub fn new(imports: &'a [RazorSyntaxTree], tag_helpers: &'a [Arc<TagHelperDescriptor>]) -> Self {
        Self {
            imports,
            tag_helpers,
            tag_helper_context: None,
            import_diagnostics: Vec::new(),
        }
    }
}

pub trait RazorSyntaxTreePass: Send + Sync {
    fn name(&self) -> &str;

    /// Passes run in ascending order; ties keep registration order.
    fn order(&self) -> i32 {
        DEFAULT_SYNTAX_TREE_PASS_ORDER
    }

    /// Returns the rewritten tree, keeping the diagnostics of `tree`.
    fn execute(&self, context: &mut SyntaxTreePassContext<'_>, tree: &RazorSyntaxTree) -> RazorSyntaxTree;
}

/// Reports a `@section` inside another directive. The inner section stays
/// in the tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct NestedSectionPass;

impl RazorSyntaxTreePass for NestedSectionPass {
    fn name(&self) -> &str {
        "nested-section"
    }

    fn execute(&self, _context: &mut SyntaxTreePassContext<'_>, tree: &RazorSyntaxTree) -> RazorSyntaxTree {
        let mut verifier = NestedSectionVerifier {
            source: tree.source(),
            depth: 0,
            found: 0,
        };
        let rewritten = rewrite::apply(tree, &mut verifier);
        if verifier.found > 0 {
            debug!("{} nested section(s)", verifier.found);
        }
        rewritten
    }
}

struct NestedSectionVerifier<'a> {
    source: &'a RazorSourceDocument,
    depth: usize,
    found: usize,
}

impl SyntaxRewriter for NestedSectionVerifier<'_> {
    fn rewrite_block(&mut self, block: &Arc<Block>) -> SyntaxNode {
        if block.kind != BlockKind::Directive {
            return rewrite_children(self, block);
        }

        let nested = self.depth > 0
            && block
                .generator
                .directive()
                .map_or(false, |descriptor| descriptor.directive == SECTION_DIRECTIVE);

        self.depth += 1;
        let rewritten = rewrite_children(self, block);
        self.depth -= 1;

        if !nested {
            return rewritten;
        }
        let SyntaxNode::Block(rewritten) = rewritten else {
            return rewritten;
        };

        self.found += 1;
        let mut block = Block::clone(&rewritten);
        // Leading whitespace may precede the transition.
        let start = block
            .children()
            .iter()
            .find(|child| child.is_span_of(SpanKind::Transition))
            .map_or_else(|| block.start(), SyntaxNode::start);
        block.diagnostics.push(RazorDiagnostic::new(
            DiagnosticCode::SectionsCannotBeNested,
            self.source.span(start, SECTION_DIRECTIVE.len() + 1),
            &[SECTION_DIRECTIVE],
        ));
        SyntaxNode::Block(Arc::new(block))
    }
}

/// Resolves the tag helper directives of the document and its imports, then
/// binds elements against the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagHelperBinderPass;

impl RazorSyntaxTreePass for TagHelperBinderPass {
    fn name(&self) -> &str {
        "tag-helper-binder"
    }

    fn order(&self) -> i32 {
        TAG_HELPER_BINDING_ORDER
    }

    fn execute(&self, context: &mut SyntaxTreePassContext<'_>, tree: &RazorSyntaxTree) -> RazorSyntaxTree {
        let (tag_helper_context, import_diagnostics, diagnostics) =
            resolve_tag_helpers(context.tag_helpers, context.imports, tree);

        let rewritten = rewrite_tag_helpers(tree, &tag_helper_context.binder());
        trace!(
            "{} directive diagnostic(s), {} from imports",
            diagnostics.len(),
            import_diagnostics.len()
        );

        context.tag_helper_context = Some(tag_helper_context);
        context.import_diagnostics.extend(import_diagnostics);
        rewritten.with_root(Arc::clone(rewritten.root()), diagnostics)
    }
}

/// The passes every engine runs.
pub fn default_syntax_tree_passes() -> Vec<Arc<dyn RazorSyntaxTreePass>> {
    vec![Arc::new(NestedSectionPass), Arc::new(TagHelperBinderPass)]
}
