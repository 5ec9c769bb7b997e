//! Passes over a classified document.

use crate::node::{AnnotationKey, IntermediateNode, NodeKind};
use crate::options::CodeGenerationOptions;
use log::trace;
use razor_parser::directives::{FUNCTIONS_DIRECTIVE, INHERITS_DIRECTIVE, SECTION_DIRECTIVE};
use razor_parser::RazorSourceDocument;
use smol_str::SmolStr;
use std::sync::Arc;

pub const DEFAULT_PASS_ORDER: i32 = 0;

/// What a pass may read besides the document itself.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub source: &'a RazorSourceDocument,
    pub options: &'a CodeGenerationOptions,
}

pub trait IntermediateNodePass: Send + Sync {
    fn name(&self) -> &str;

    /// Passes run in ascending order; ties keep registration order.
    fn order(&self) -> i32 {
        DEFAULT_PASS_ORDER
    }

    fn execute(&self, context: &PassContext<'_>, document: &mut IntermediateNode);
}

/// Moves the code of every `@functions` block into the class, after the
/// render method.
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionsDirectivePass;

impl IntermediateNodePass for FunctionsDirectivePass {
    fn name(&self) -> &str {
        "functions"
    }

    fn execute(&self, _context: &PassContext<'_>, document: &mut IntermediateNode) {
        if document.find_annotated(AnnotationKey::PrimaryClass).is_none() {
            return;
        }
        let directives = document.extract_where(&mut |node| is_directive(node, FUNCTIONS_DIRECTIVE));
        if directives.is_empty() {
            return;
        }
        trace!("moving {} @functions block(s) into the class", directives.len());

        let Some(class) = document.find_annotated_mut(AnnotationKey::PrimaryClass) else {
            return;
        };
        for directive in directives {
            class.children.extend(
                directive
                    .children
                    .into_iter()
                    .filter(|child| matches!(child.kind, NodeKind::CSharpCode)),
            );
        }
    }
}

/// Sets the class base type from the last `@inherits`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InheritsDirectivePass;

impl IntermediateNodePass for InheritsDirectivePass {
    fn name(&self) -> &str {
        "inherits"
    }

    fn execute(&self, _context: &PassContext<'_>, document: &mut IntermediateNode) {
        let base_type = document
            .descendants()
            .filter(|node| is_directive(node, INHERITS_DIRECTIVE))
            .filter_map(first_token)
            .last();
        let Some(base_type) = base_type else {
            return;
        };

        if let Some(class) = document.find_annotated_mut(AnnotationKey::PrimaryClass) {
            if let NodeKind::ClassDeclaration { base_type: slot, .. } = &mut class.kind {
                trace!("base type set to {base_type}");
                *slot = Some(base_type);
            }
        }
    }
}

/// Replaces `@section` directives with [`NodeKind::Section`] nodes holding
/// the section body.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionDirectivePass;

impl IntermediateNodePass for SectionDirectivePass {
    fn name(&self) -> &str {
        "section"
    }

    fn execute(&self, _context: &PassContext<'_>, document: &mut IntermediateNode) {
        document.for_each_mut(&mut |node| {
            if !is_directive(node, SECTION_DIRECTIVE) {
                return;
            }
            let Some(section_name) = first_token(node) else {
                return;
            };
            node.kind = NodeKind::Section { section_name };
            node.children
                .retain(|child| !matches!(child.kind, NodeKind::DirectiveToken { .. }));
        });
    }
}

/// The passes every engine runs, in order.
pub fn default_passes() -> Vec<Arc<dyn IntermediateNodePass>> {
    vec![
        Arc::new(FunctionsDirectivePass),
        Arc::new(InheritsDirectivePass),
        Arc::new(SectionDirectivePass),
    ]
}

fn is_directive(node: &IntermediateNode, directive: &str) -> bool {
    matches!(&node.kind, NodeKind::Directive { name, .. } if name == directive)
}

fn first_token(node: &IntermediateNode) -> Option<SmolStr> {
    node.children.iter().find_map(|child| match &child.kind {
        NodeKind::DirectiveToken { content, .. } => Some(content.clone()),
        _ => None,
    })
}
