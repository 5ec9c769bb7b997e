//! The syntax tree.
//!
//! Leaves are [`Span`]s, containers are [`Block`]s, and both are held
//! through [`SyntaxNode`] handles so rewritten trees share whatever they did
//! not change.

mod generator;
mod node;
mod tag_helper;
mod tree;
mod visitor;

pub use generator::{BlockChunkGenerator, LocationTagged, SpanChunkGenerator, TagHelperDirective};
pub use node::{AcceptedCharacters, Block, BlockKind, Descendants, Span, SpanKind, SyntaxNode};
pub use tag_helper::{
    AttributeValueStyle, BoundAttributeMatch, TagHelperAttributeNode, TagHelperInfo, TagMode,
};
pub use tree::RazorSyntaxTree;
pub use visitor::{
    rebuild_if_changed, rewrite_child_list, rewrite_children, rewrite_node, walk_block, walk_node,
    SyntaxRewriter, SyntaxVisitor,
};

use std::fmt::Write;

/// Renders a tree one node per line, for tests and debugging.
///
/// ```text
/// Markup block [0..12) Gen<None>
///     Markup span [0..4) Gen<Markup> Accepts:Any "foo "
/// ```
pub fn dump(node: &SyntaxNode) -> String {
    let mut out = String::new();
    dump_node(node, 0, &mut out);
    out
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    let start = node.start().absolute_index;
    let end = start + node.length();
    match node {
        SyntaxNode::Span(span) => {
            let _ = writeln!(
                out,
                "{indent}{} span [{start}..{end}) Gen<{}> Accepts:{:?} {:?}",
                span.kind,
                span.generator.name(),
                span.accepted,
                span.content()
            );
        }
        SyntaxNode::Block(block) => {
            let _ = writeln!(
                out,
                "{indent}{} block [{start}..{end}) Gen<{}>",
                block.kind,
                block.generator.name()
            );
            for child in block.children() {
                dump_node(child, depth + 1, out);
            }
        }
    }
}
