use pretty_assertions::assert_eq;
use razor_ir::{
    classify, default_passes, dump, lower, AnnotationKey, CodeGenerationOptions, DefaultDocumentClassifier,
    DocumentClassifier, IntermediateNode, NodeKind, PassContext,
};
use razor_parser::rewrite::rewrite_tag_helpers;
use razor_parser::{parse, RazorLanguageVersion, RazorParserOptions, RazorSourceDocument, RazorSyntaxTree};
use razor_tag_helpers::{TagHelperBinder, TagHelperDescriptor, TagHelperDescriptorBuilder};
use std::sync::Arc;

fn parse_at(text: &str, path: &str) -> RazorSyntaxTree {
    let source = RazorSourceDocument::new(text, Some(path));
    parse(&source, &RazorParserOptions::new(RazorLanguageVersion::V3_0))
}

fn lower_text(text: &str) -> IntermediateNode {
    lower(&parse_at(text, "Index.cshtml"), &[])
}

/// Lowers, classifies and runs the default passes.
fn compile(tree: &RazorSyntaxTree, options: &CodeGenerationOptions) -> IntermediateNode {
    let mut document = lower(tree, &[]);
    let context = PassContext {
        source: tree.source(),
        options,
    };
    classify(&context, &[&DefaultDocumentClassifier], &mut document);
    for pass in default_passes() {
        pass.execute(&context, &mut document);
    }
    document
}

fn compile_text(text: &str) -> IntermediateNode {
    compile(&parse_at(text, "Index.cshtml"), &CodeGenerationOptions::default())
}

fn kinds(nodes: &[IntermediateNode]) -> Vec<&'static str> {
    nodes.iter().map(|node| node.kind.name()).collect()
}

fn find<'a>(document: &'a IntermediateNode, name: &str) -> Vec<&'a IntermediateNode> {
    document
        .descendants()
        .filter(|node| node.kind.name() == name)
        .collect()
}

fn primary(document: &IntermediateNode, key: AnnotationKey) -> &IntermediateNode {
    document.find_annotated(key).unwrap()
}

fn input_helper() -> TagHelperDescriptor {
    TagHelperDescriptorBuilder::new("InputTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("input");
        })
        .bound_attribute(|attribute| {
            attribute.name("class").property_name("Class").type_name("System.String");
        })
        .bound_attribute(|attribute| {
            attribute.name("count").property_name("Count").type_name("System.Int32");
        })
        .build()
        .unwrap()
}

fn list_helper() -> TagHelperDescriptor {
    TagHelperDescriptorBuilder::new("ListTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("my-list");
        })
        .build()
        .unwrap()
}

fn lower_with_tag_helpers(text: &str, descriptors: Vec<TagHelperDescriptor>) -> IntermediateNode {
    let tree = parse_at(text, "TagHelpers.cshtml");
    let binder = TagHelperBinder::new(None, descriptors.into_iter().map(Arc::new));
    lower(&rewrite_tag_helpers(&tree, &binder), &[])
}

#[test]
fn test_implicit_expression_between_text() {
    let document = lower_text("foo @bar baz");
    insta::assert_snapshot!(dump(&document), @r###"
    Document
        Checksum
        HtmlContent [0..4)
            IntermediateToken Html "foo " [0..4)
        CSharpExpression [5..8)
            IntermediateToken CSharp "bar" [5..8)
        HtmlContent [8..12)
            IntermediateToken Html " baz" [8..12)
    "###);
}

#[test]
fn test_adjacent_markup_is_coalesced() {
    let document = lower_text("<p>Hello @name!</p>");
    let children = &document.children[1..];
    assert_eq!(kinds(children), vec!["HtmlContent", "CSharpExpression", "HtmlContent"]);

    let opening = children[0].source.as_ref().unwrap();
    assert_eq!((opening.absolute_index, opening.length), (0, 9));
    assert_eq!(children[0].token_content(), "<p>Hello ");
    assert_eq!(children[2].token_content(), "!</p>");
}

#[test]
fn test_explicit_expression_span_covers_content_only() {
    let document = lower_text("<p>@(a + b)</p>");
    let expression = find(&document, "CSharpExpression")[0];
    assert_eq!(expression.token_content(), "a + b");

    let source = expression.source.as_ref().unwrap();
    assert_eq!((source.absolute_index, source.length), (5, 5));
}

#[test]
fn test_statement_block_lowers_to_code() {
    let document = lower_text("@{ var x = 1; }");
    let code: String = find(&document, "CSharpCode")
        .iter()
        .map(|node| node.token_content())
        .collect();
    assert!(code.contains("var x = 1;"));
    assert!(find(&document, "HtmlContent").is_empty());
}

#[test]
fn test_template_span_is_synthesized_from_content() {
    let document = lower_text("@{ RenderFragment f = @<p>x</p>; }");
    let templates = find(&document, "Template");
    assert_eq!(templates.len(), 1);

    let source = templates[0].source.as_ref().unwrap();
    assert_eq!((source.absolute_index, source.length), (23, 8));
    assert_eq!(templates[0].children[0].token_content(), "<p>x</p>");
}

#[test]
fn test_razor_comment_is_dropped() {
    let document = lower_text("a@* note *@b");
    let html = find(&document, "HtmlContent");
    let text: String = html.iter().map(|node| node.token_content()).collect();
    assert_eq!(text, "ab");
}

#[test]
fn test_dynamic_attribute_value() {
    let document = lower_text("<a href=\"@url\">");
    assert_eq!(
        kinds(&document.children[1..]),
        vec!["HtmlContent", "HtmlAttribute", "HtmlContent"]
    );

    let attribute = &document.children[2];
    assert_eq!(
        attribute.kind,
        NodeKind::HtmlAttribute {
            name: "href".into(),
            prefix: " href=\"".into(),
            suffix: "\"".into(),
        }
    );
    assert_eq!(kinds(&attribute.children), vec!["CSharpExpressionAttributeValue"]);
    assert_eq!(attribute.children[0].token_content(), "url");
}

#[test]
fn test_directive_tokens() {
    let document = lower_text("@inherits Foo.Bar<Baz>\n");
    let directive = find(&document, "Directive")[0];
    let tokens = kinds(&directive.children);
    assert_eq!(tokens, vec!["DirectiveToken"]);
    assert!(matches!(
        &directive.children[0].kind,
        NodeKind::DirectiveToken { content, .. } if content == "Foo.Bar<Baz>"
    ));
}

#[test]
fn test_directive_with_errors_is_malformed() {
    let document = lower_text("@inherits\n");
    assert!(find(&document, "Directive").is_empty());

    let malformed = find(&document, "MalformedDirective");
    assert_eq!(malformed.len(), 1);
    assert!(!malformed[0].diagnostics.is_empty());
    assert!(!document.all_diagnostics().is_empty());
}

#[test]
fn test_usings_are_deduplicated_across_imports() {
    let import = parse_at("@using System\n@using System.Text\n", "_ViewImports.cshtml");
    let tree = parse_at("@using System.Text\n<p></p>", "Index.cshtml");
    let document = lower(&tree, &[import]);

    let usings: Vec<&IntermediateNode> = document
        .children
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::UsingDirective { .. }))
        .collect();
    let names: Vec<String> = usings
        .iter()
        .map(|node| match &node.kind {
            NodeKind::UsingDirective { content, .. } => content.to_string(),
            _ => String::new(),
        })
        .collect();
    assert_eq!(names, vec!["System", "System.Text"]);

    assert_eq!(
        usings[0].annotation(AnnotationKey::Imported),
        Some("_ViewImports.cshtml")
    );
    // The main document's occurrence wins.
    assert_eq!(usings[1].annotation(AnnotationKey::Imported), None);
    assert_eq!(
        usings[1].source.as_ref().and_then(|source| source.file_path.as_deref()),
        Some("Index.cshtml")
    );
}

#[test]
fn test_imports_contribute_only_single_line_directives() {
    let import = parse_at(
        "@inherits BasePage\n@functions { int x; }\n<p>ignored</p>\n",
        "_ViewImports.cshtml",
    );
    let tree = parse_at("", "Index.cshtml");
    let document = lower(&tree, &[import]);

    assert!(find(&document, "HtmlContent").is_empty());
    assert!(find(&document, "CSharpCode").is_empty());

    let directives = find(&document, "Directive");
    assert_eq!(directives.len(), 1);
    assert_eq!(
        directives[0].annotation(AnnotationKey::Imported),
        Some("_ViewImports.cshtml")
    );
}

#[test]
fn test_checksum_is_first_and_stable() {
    let first = lower_text("<p>a</p>");
    let again = lower_text("<p>a</p>");
    let other = lower_text("<p>b</p>");

    let digest = |document: &IntermediateNode| match &document.children[0].kind {
        NodeKind::Checksum { algorithm, digest, .. } => {
            assert_eq!(*algorithm, "blake3");
            digest.clone()
        }
        kind => panic!("expected a checksum, found {}", kind.name()),
    };
    assert_eq!(digest(&first).len(), 64);
    assert_eq!(digest(&first), digest(&again));
    assert_ne!(digest(&first), digest(&other));
}

#[test]
fn test_classifier_builds_skeleton() {
    let document = compile_text("@using System\n<p>@x</p>");
    assert_eq!(document.document_kind(), Some("default"));
    assert_eq!(
        kinds(&document.children),
        vec!["Checksum", "UsingDirective", "NamespaceDeclaration"]
    );

    let class = primary(&document, AnnotationKey::PrimaryClass);
    assert!(matches!(
        &class.kind,
        NodeKind::ClassDeclaration { class_name, base_type: None, .. } if class_name == "Index"
    ));

    let method = primary(&document, AnnotationKey::PrimaryMethod);
    assert!(kinds(&method.children).contains(&"CSharpExpression"));
}

#[test]
fn test_class_name_option_overrides_path() {
    let tree = parse_at("<p></p>", "Views/Home/Index.cshtml");
    let document = compile(&tree, &CodeGenerationOptions::default().with_class_name("HomePage"));
    assert_eq!(
        primary(&document, AnnotationKey::PrimaryClass).annotation(AnnotationKey::PrimaryClass),
        Some("HomePage")
    );

    let document = compile(&tree, &CodeGenerationOptions::default());
    assert_eq!(
        primary(&document, AnnotationKey::PrimaryClass).annotation(AnnotationKey::PrimaryClass),
        Some("Views_Home_Index")
    );
}

struct NeverClassifier;

impl DocumentClassifier for NeverClassifier {
    fn document_kind(&self) -> &str {
        "never"
    }

    fn is_match(&self, _context: &PassContext<'_>, _document: &IntermediateNode) -> bool {
        false
    }
}

#[test]
fn test_first_matching_classifier_wins_once() {
    let tree = parse_at("<p></p>", "Index.cshtml");
    let options = CodeGenerationOptions::default();
    let context = PassContext {
        source: tree.source(),
        options: &options,
    };
    let mut document = lower(&tree, &[]);

    let kind = classify(&context, &[&NeverClassifier, &DefaultDocumentClassifier], &mut document);
    assert_eq!(kind.as_deref(), Some("default"));

    let before = document.clone();
    let kind = classify(&context, &[&DefaultDocumentClassifier], &mut document);
    assert_eq!(kind.as_deref(), Some("default"));
    assert_eq!(document, before);

    let mut unclaimed = lower(&tree, &[]);
    assert_eq!(classify(&context, &[&NeverClassifier], &mut unclaimed), None);
    assert_eq!(unclaimed.document_kind(), None);
}

#[test]
fn test_functions_move_into_class() {
    let document = compile_text("@functions { int x; }\n<p></p>");

    let method = primary(&document, AnnotationKey::PrimaryMethod);
    assert!(!kinds(&method.children).contains(&"Directive"));

    let class = primary(&document, AnnotationKey::PrimaryClass);
    let last = class.children.last().unwrap();
    assert_eq!(last.kind.name(), "CSharpCode");
    assert!(last.token_content().contains("int x;"));
}

#[test]
fn test_inherits_sets_base_type() {
    let document = compile_text("@inherits Base<T>\n<p></p>");
    let class = primary(&document, AnnotationKey::PrimaryClass);
    assert!(matches!(
        &class.kind,
        NodeKind::ClassDeclaration { base_type: Some(base), .. } if base == "Base<T>"
    ));
}

#[test]
fn test_section_directive_becomes_section() {
    let document = compile_text("@section Scripts { <p>x</p> }");
    assert!(find(&document, "Directive").is_empty());

    let sections = find(&document, "Section");
    assert_eq!(sections.len(), 1);
    assert_eq!(
        sections[0].kind,
        NodeKind::Section {
            section_name: "Scripts".into()
        }
    );
    assert!(find(sections[0], "DirectiveToken").is_empty());

    let html: String = find(sections[0], "HtmlContent")
        .iter()
        .map(|node| node.token_content())
        .collect();
    assert!(html.contains("<p>x</p>"));
}

#[test]
fn test_tag_helper_lowering() {
    let document = lower_with_tag_helpers(
        "<input class=\"x\" count=\"5\" title=\"t\" /><input class=\"y\" />",
        vec![input_helper()],
    );

    assert_eq!(
        kinds(&document.children),
        vec!["Checksum", "FieldDeclaration", "TagHelper", "TagHelper"]
    );
    assert!(document.children[1].has_annotation(AnnotationKey::TagHelperField));

    let helper = &document.children[2];
    assert_eq!(
        kinds(&helper.children),
        vec![
            "CreateTagHelper",
            "SetTagHelperProperty",
            "SetTagHelperProperty",
            "AddTagHelperHtmlAttribute"
        ]
    );

    let class = &helper.children[1];
    assert!(matches!(
        &class.kind,
        NodeKind::SetTagHelperProperty { property_name, field_name, .. }
            if property_name == "Class" && field_name == "__InputTagHelper"
    ));
    assert_eq!(kinds(&class.children), vec!["HtmlContent"]);
    assert_eq!(class.children[0].token_content(), "x");

    // Non-string properties take their literal value as code.
    let count = &helper.children[2];
    assert_eq!(kinds(&count.children), vec!["CSharpExpression"]);
    assert_eq!(count.children[0].token_content(), "5");

    let title = &helper.children[3];
    assert_eq!(title.children[0].token_content(), "t");
}

#[test]
fn test_tag_helper_fields_open_the_class() {
    let tree = parse_at("<p>a</p><input class=\"x\" />", "TagHelpers.cshtml");
    let binder = TagHelperBinder::new(None, [Arc::new(input_helper())]);
    let tree = rewrite_tag_helpers(&tree, &binder);
    let document = compile(&tree, &CodeGenerationOptions::default());

    let class = primary(&document, AnnotationKey::PrimaryClass);
    assert_eq!(kinds(&class.children), vec!["FieldDeclaration", "MethodDeclaration"]);

    let method = primary(&document, AnnotationKey::PrimaryMethod);
    assert_eq!(kinds(&method.children), vec!["HtmlContent", "TagHelper"]);
}

#[test]
fn test_tag_helper_body() {
    let document = lower_with_tag_helpers("<my-list><p>x</p></my-list>", vec![list_helper()]);
    let helper = find(&document, "TagHelper")[0];
    assert_eq!(kinds(&helper.children), vec!["TagHelperBody", "CreateTagHelper"]);

    let body = &helper.children[0];
    assert_eq!(kinds(&body.children), vec!["HtmlContent"]);
    assert_eq!(body.children[0].token_content(), "<p>x</p>");
}
