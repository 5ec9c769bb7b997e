//! Resolution of `@addTagHelper`, `@removeTagHelper` and `@tagHelperPrefix`
//! into the tag helpers in effect for a document.

use log::{debug, trace};
use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
use razor_parser::directives::TAG_HELPER_PREFIX_DIRECTIVE;
use razor_parser::syntax::{Span, SpanChunkGenerator, SyntaxNode, TagHelperDirective};
use razor_parser::RazorSyntaxTree;
use razor_tag_helpers::{find_invalid_name_character, LookupInfo, TagHelperBinder, TagHelperDescriptor};
use smol_str::SmolStr;
use std::sync::Arc;

/// The prefix and descriptors a document binds against.
#[derive(Debug, Clone, Default)]
pub struct TagHelperDocumentContext {
    pub prefix: Option<SmolStr>,
    /// In the order they were supplied to the engine.
    pub descriptors: Vec<Arc<TagHelperDescriptor>>,
}

impl TagHelperDocumentContext {
    pub fn binder(&self) -> TagHelperBinder {
        TagHelperBinder::new(self.prefix.clone(), self.descriptors.iter().cloned())
    }
}

/// Accumulates tag helper directives across a document and its imports.
///
/// Trees are visited in the order their directives apply: imports first,
/// then the document itself.
#[derive(Debug)]
pub struct TagHelperDirectiveResolver<'a> {
    available: &'a [Arc<TagHelperDescriptor>],
    selected: Vec<bool>,
    prefix: Option<SmolStr>,
    prefix_seen: bool,
}

impl<'a> TagHelperDirectiveResolver<'a> {
    pub fn new(available: &'a [Arc<TagHelperDescriptor>]) -> Self {
        Self {
            available,
            selected: vec![false; available.len()],
            prefix: None,
            prefix_seen: false,
        }
    }

    /// Applies the directives of `tree` and returns the problems found in
    /// their values.
    pub fn visit(&mut self, tree: &RazorSyntaxTree) -> Vec<RazorDiagnostic> {
        let mut diagnostics = Vec::new();
        for node in tree.root_node().descendants() {
            let SyntaxNode::Span(span) = node else {
                continue;
            };
            let Some(directive) = span.generator.tag_helper_directive() else {
                continue;
            };
            if !directive.diagnostics.is_empty() {
                diagnostics.extend(directive.diagnostics.iter().cloned());
                continue;
            }
            match &span.generator {
                SpanChunkGenerator::AddTagHelper(directive) => {
                    self.apply_lookup(tree, &span, directive, true, &mut diagnostics);
                }
                SpanChunkGenerator::RemoveTagHelper(directive) => {
                    self.apply_lookup(tree, &span, directive, false, &mut diagnostics);
                }
                SpanChunkGenerator::TagHelperPrefix(directive) => {
                    self.apply_prefix(tree, &span, directive, &mut diagnostics);
                }
                _ => {}
            }
        }
        diagnostics
    }

    pub fn finish(self) -> TagHelperDocumentContext {
        let descriptors: Vec<_> = self
            .available
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(descriptor, _)| Arc::clone(descriptor))
            .collect();
        debug!(
            "{} of {} tag helper(s) in effect, prefix {:?}",
            descriptors.len(),
            self.available.len(),
            self.prefix
        );
        TagHelperDocumentContext {
            prefix: self.prefix,
            descriptors,
        }
    }

    fn apply_lookup(
        &mut self,
        tree: &RazorSyntaxTree,
        span: &Span,
        directive: &TagHelperDirective,
        add: bool,
        diagnostics: &mut Vec<RazorDiagnostic>,
    ) {
        let Some(lookup) = LookupInfo::parse(&directive.lookup_text) else {
            diagnostics.push(RazorDiagnostic::new(
                DiagnosticCode::InvalidTagHelperLookupText,
                tree.source().span(span.start(), span.length()),
                &[&directive.lookup_text],
            ));
            return;
        };

        let mut matched = 0;
        for (descriptor, selected) in self.available.iter().zip(self.selected.iter_mut()) {
            if lookup.matches(descriptor) {
                *selected = add;
                matched += 1;
            }
        }
        trace!(
            "{} '{}' matched {matched} tag helper(s)",
            if add { "add" } else { "remove" },
            directive.lookup_text
        );
    }

    fn apply_prefix(
        &mut self,
        tree: &RazorSyntaxTree,
        span: &Span,
        directive: &TagHelperDirective,
        diagnostics: &mut Vec<RazorDiagnostic>,
    ) {
        if self.prefix_seen {
            return;
        }
        self.prefix_seen = true;

        let prefix = directive.lookup_text.clone();
        if let Some(invalid) = find_invalid_name_character(&prefix) {
            diagnostics.push(RazorDiagnostic::new(
                DiagnosticCode::InvalidTagHelperPrefixValue,
                tree.source().span(span.start(), span.length()),
                &[TAG_HELPER_PREFIX_DIRECTIVE, &invalid.to_string(), &prefix],
            ));
            return;
        }
        if !prefix.is_empty() {
            self.prefix = Some(prefix);
        }
    }
}

/// Resolves the tag helpers in effect for `tree` given its `imports`.
///
/// Returns the context together with the diagnostics found in the imports
/// and those found in `tree`, in that order.
pub fn resolve_tag_helpers(
    available: &[Arc<TagHelperDescriptor>],
    imports: &[RazorSyntaxTree],
    tree: &RazorSyntaxTree,
) -> (TagHelperDocumentContext, Vec<RazorDiagnostic>, Vec<RazorDiagnostic>) {
    let mut resolver = TagHelperDirectiveResolver::new(available);
    let mut import_diagnostics = Vec::new();
    for import in imports {
        import_diagnostics.extend(resolver.visit(import));
    }
    let diagnostics = resolver.visit(tree);
    (resolver.finish(), import_diagnostics, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use razor_parser::{parse, RazorParserOptions, RazorSourceDocument};
    use razor_tag_helpers::TagHelperDescriptorBuilder;

    fn descriptor(name: &str, assembly: &str) -> Arc<TagHelperDescriptor> {
        Arc::new(
            TagHelperDescriptorBuilder::new(name, assembly)
                .tag_matching_rule(|rule| {
                    rule.require_tag_name("p");
                })
                .build()
                .unwrap(),
        )
    }

    fn tree(text: &str) -> RazorSyntaxTree {
        parse(&RazorSourceDocument::new(text, Some("Index.cshtml")), &RazorParserOptions::default())
    }

    fn names(context: &TagHelperDocumentContext) -> Vec<&str> {
        context.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    fn ids(diagnostics: &[RazorDiagnostic]) -> Vec<&'static str> {
        diagnostics.iter().map(RazorDiagnostic::id).collect()
    }

    #[test]
    fn test_prefix_pattern_and_exact_select_the_same_descriptor() {
        let available = [descriptor("FooBar", "A"), descriptor("Foo", "A"), descriptor("Baz", "A")];
        let main = tree("@addTagHelper \"Foo*, A\"\n@addTagHelper \"FooBar, A\"\n");

        let (context, imports, diagnostics) = resolve_tag_helpers(&available, &[], &main);
        assert_eq!(names(&context), vec!["FooBar", "Foo"]);
        assert!(imports.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_assembly_must_match_exactly() {
        let available = [descriptor("Foo", "A"), descriptor("Foo", "AB")];
        let main = tree("@addTagHelper *, A\n");

        let (context, _, _) = resolve_tag_helpers(&available, &[], &main);
        assert_eq!(context.descriptors.len(), 1);
        assert_eq!(context.descriptors[0].assembly_name, "A");
    }

    #[test]
    fn test_remove_after_add() {
        let available = [descriptor("Foo", "A"), descriptor("Bar", "A")];
        let main = tree("@addTagHelper *, A\n@removeTagHelper Foo, A\n");

        let (context, _, _) = resolve_tag_helpers(&available, &[], &main);
        assert_eq!(names(&context), vec!["Bar"]);
    }

    #[test]
    fn test_imports_apply_first() {
        let available = [descriptor("Foo", "A")];
        let import = tree("@addTagHelper *, A\n@tagHelperPrefix th:\n");
        let main = tree("@removeTagHelper Foo, A\n@tagHelperPrefix other:\n");

        let (context, _, _) = resolve_tag_helpers(&available, &[import], &main);
        assert!(context.descriptors.is_empty());
        assert_eq!(context.prefix.as_deref(), Some("th:"));
    }

    #[test]
    fn test_malformed_lookup_text() {
        let available = [descriptor("Foo", "A")];
        let main = tree("@addTagHelper Foo\n");

        let (context, _, diagnostics) = resolve_tag_helpers(&available, &[], &main);
        assert!(context.descriptors.is_empty());
        assert_eq!(ids(&diagnostics), vec!["RZ1036"]);
        assert_eq!(main.source().slice(&diagnostics[0].span), "Foo");
    }

    #[test]
    fn test_invalid_prefix() {
        let main = tree("@tagHelperPrefix \"th!\"\n");

        let (context, _, diagnostics) = resolve_tag_helpers(&[], &[], &main);
        assert_eq!(context.prefix, None);
        assert_eq!(ids(&diagnostics), vec!["RZ1020"]);
        assert_eq!(
            diagnostics[0].message(),
            "Invalid tag helper directive 'tagHelperPrefix' value. '!' is not allowed in prefix 'th!'."
        );
    }

    #[test]
    fn test_directive_value_problems_are_reported() {
        let available = [descriptor("Foo", "A")];
        let import = tree("@addTagHelper\n");
        let main = tree("@addTagHelper \"*, A\n");

        let (context, imports, diagnostics) = resolve_tag_helpers(&available, &[import], &main);
        assert!(context.descriptors.is_empty());
        assert_eq!(ids(&imports), vec!["RZ1018"]);
        assert!(ids(&diagnostics).contains(&"RZ1019"));
    }
}
