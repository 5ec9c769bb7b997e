use camino::Utf8Path;
use pretty_assertions::assert_eq;
use razor_engine::{EngineError, RazorCodeDocument, RazorConfiguration, RazorEngine};
use razor_ir::{AnnotationKey, IntermediateNode, NodeKind};
use razor_parser::syntax::{BlockKind, SyntaxNode};
use razor_parser::{DirectiveDescriptor, RazorSourceDocument};
use razor_tag_helpers::{TagHelperDescriptor, TagHelperDescriptorBuilder};
use std::sync::Arc;

fn source(text: &str) -> RazorSourceDocument {
    RazorSourceDocument::new(text, Some("Index.cshtml"))
}

fn process(engine: &RazorEngine, text: &str) -> RazorCodeDocument {
    engine.process(&source(text), &[])
}

fn ids(document: &RazorCodeDocument) -> Vec<&'static str> {
    document.diagnostics().iter().map(|diagnostic| diagnostic.id()).collect()
}

fn find<'a>(node: &'a IntermediateNode, name: &str) -> Vec<&'a IntermediateNode> {
    node.descendants().filter(|node| node.kind.name() == name).collect()
}

fn kinds(nodes: &[IntermediateNode]) -> Vec<&'static str> {
    nodes.iter().map(|node| node.kind.name()).collect()
}

fn method_body(document: &RazorCodeDocument) -> &[IntermediateNode] {
    &document
        .document_node()
        .find_annotated(AnnotationKey::PrimaryMethod)
        .unwrap()
        .children
}

fn tag_helper(name: &str, assembly: &str, tag: &str) -> Arc<TagHelperDescriptor> {
    Arc::new(
        TagHelperDescriptorBuilder::new(name, assembly)
            .tag_matching_rule(|rule| {
                rule.require_tag_name(tag);
            })
            .bound_attribute(|attribute| {
                attribute.name("class").property_name("Class").type_name("System.String");
            })
            .build()
            .unwrap(),
    )
}

fn input_engine() -> RazorEngine {
    RazorEngine::builder()
        .tag_helper(tag_helper("InputTagHelper", "TestAssembly", "input"))
        .build()
        .unwrap()
}

#[test]
fn test_implicit_expression_in_text() {
    let engine = RazorEngine::builder().build().unwrap();
    let document = process(&engine, "foo @bar baz");

    assert!(document.diagnostics().is_empty());
    let body = method_body(&document);
    assert_eq!(kinds(body), vec!["HtmlContent", "CSharpExpression", "HtmlContent"]);
    assert_eq!(body[0].token_content(), "foo ");
    assert_eq!(body[1].token_content(), "bar");
    assert_eq!(body[2].token_content(), " baz");
}

#[test]
fn test_custom_single_line_directive() {
    let custom = DirectiveDescriptor::create_single_line_directive("custom", |builder| {
        builder.add_string_token();
    })
    .unwrap();
    let engine = RazorEngine::builder().directive(custom).build().unwrap();
    let document = process(&engine, "@custom \"AString\"");

    assert!(document.diagnostics().is_empty());
    let directives = find(document.document_node(), "Directive");
    assert_eq!(directives.len(), 1);
    assert!(matches!(&directives[0].kind, NodeKind::Directive { name, .. } if name == "custom"));
    assert_eq!(kinds(&directives[0].children), vec!["DirectiveToken"]);
    assert!(matches!(
        &directives[0].children[0].kind,
        NodeKind::DirectiveToken { content, .. } if content == "\"AString\""
    ));
}

#[test]
fn test_custom_code_block_directive_at_end_of_file() {
    let custom = DirectiveDescriptor::create_code_block_directive("custom", |builder| {
        builder.add_string_token();
    })
    .unwrap();
    let engine = RazorEngine::builder().directive(custom).build().unwrap();
    let document = process(&engine, "@custom \"Hello\" {");

    assert_eq!(ids(&document), vec!["RZ1006"]);
    assert!(document.diagnostics()[0].message().contains("\"}\""));
    let directives = document
        .syntax_tree()
        .root_node()
        .descendants()
        .filter(|node| node.is_block_of(BlockKind::Directive))
        .count();
    assert_eq!(directives, 1);
}

#[test]
fn test_bound_attribute_is_not_plain_html() {
    let engine = input_engine();
    let document = process(&engine, "@addTagHelper *, TestAssembly\n<input class=\"x\" />");

    assert!(document.diagnostics().is_empty());
    let helpers = find(document.document_node(), "TagHelper");
    assert_eq!(helpers.len(), 1);
    assert_eq!(kinds(&helpers[0].children), vec!["CreateTagHelper", "SetTagHelperProperty"]);
    assert!(find(helpers[0], "AddTagHelperHtmlAttribute").is_empty());

    let class = primary_class(&document);
    assert_eq!(kinds(&class.children), vec!["FieldDeclaration", "MethodDeclaration"]);
}

fn primary_class(document: &RazorCodeDocument) -> &IntermediateNode {
    document
        .document_node()
        .find_annotated(AnnotationKey::PrimaryClass)
        .unwrap()
}

#[test]
fn test_tag_helpers_need_a_directive() {
    let engine = input_engine();
    let document = process(&engine, "<input class=\"x\" />");

    assert!(document.tag_helper_context().descriptors.is_empty());
    assert!(find(document.document_node(), "TagHelper").is_empty());
}

#[test]
fn test_nested_section() {
    let engine = RazorEngine::builder().build().unwrap();
    let document = process(&engine, "@section Outer { @section Inner { <p>x</p> } }");

    assert_eq!(ids(&document), vec!["RZ1029"]);
    let sections = document
        .syntax_tree()
        .root_node()
        .descendants()
        .filter(|node| match node {
            SyntaxNode::Block(block) => block.kind == BlockKind::Directive,
            SyntaxNode::Span(_) => false,
        })
        .count();
    assert_eq!(sections, 2);

    let outer = find(document.document_node(), "Section");
    assert_eq!(outer.len(), 1);
    assert_eq!(find(outer[0], "MalformedDirective").len(), 1);
}

#[test]
fn test_prefix_and_exact_lookups_select_once() {
    let engine = RazorEngine::builder()
        .tag_helper(tag_helper("FooBar", "A", "foo-bar"))
        .tag_helper(tag_helper("FooBaz", "A", "foo-baz"))
        .tag_helper(tag_helper("Other", "A", "other"))
        .build()
        .unwrap();
    let document = process(&engine, "@addTagHelper \"Foo*, A\"\n@addTagHelper \"FooBar, A\"\n");

    let names: Vec<&str> = document
        .tag_helper_context()
        .descriptors
        .iter()
        .map(|descriptor| descriptor.name.as_str())
        .collect();
    assert_eq!(names, vec!["FooBar", "FooBaz"]);
}

#[test]
fn test_remove_tag_helper() {
    let engine = input_engine();
    let document = process(
        &engine,
        "@addTagHelper *, TestAssembly\n@removeTagHelper InputTagHelper, TestAssembly\n<input class=\"x\" />",
    );

    assert!(document.diagnostics().is_empty());
    assert!(find(document.document_node(), "TagHelper").is_empty());
}

#[test]
fn test_tag_helper_prefix() {
    let engine = input_engine();
    let document = process(
        &engine,
        "@tagHelperPrefix th:\n@addTagHelper *, TestAssembly\n<th:input class=\"a\" /><input class=\"b\" />",
    );

    assert_eq!(document.tag_helper_context().prefix.as_deref(), Some("th:"));
    let helpers = find(document.document_node(), "TagHelper");
    assert_eq!(helpers.len(), 1);
    assert!(matches!(&helpers[0].kind, NodeKind::TagHelper { tag_name, .. } if tag_name == "th:input"));
}

#[test]
fn test_directive_value_diagnostics() {
    let engine = input_engine();
    let document = process(&engine, "@addTagHelper TestAssembly\n@tagHelperPrefix \"th!\"\n");

    assert_eq!(ids(&document), vec!["RZ1036", "RZ1020"]);
    assert!(document.tag_helper_context().descriptors.is_empty());
    assert_eq!(document.tag_helper_context().prefix, None);
}

#[test]
fn test_imports_apply_before_the_document() {
    let engine = input_engine();
    let imports = [RazorSourceDocument::new(
        "@using System.Linq\n@addTagHelper *, TestAssembly\n@addTagHelper Broken\n",
        Some("_ViewImports.cshtml"),
    )];
    let document = engine.process(&source("@using System\n<input class=\"x\" />"), &imports);

    assert_eq!(ids(&document), vec!["RZ1036"]);
    assert_eq!(document.diagnostics()[0].span.file_path.as_deref(), Some("_ViewImports.cshtml"));
    assert_eq!(document.import_syntax_trees().len(), 1);
    assert_eq!(find(document.document_node(), "TagHelper").len(), 1);

    let usings: Vec<String> = document
        .document_node()
        .children
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::UsingDirective { content, .. } => Some(content.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(usings, vec!["System.Linq", "System"]);
}

#[test]
fn test_directive_passes_run() {
    let engine = RazorEngine::builder().build().unwrap();
    let document = process(
        &engine,
        "@inherits PageBase\n@functions { int count; }\n<p>@count</p>",
    );

    assert!(document.diagnostics().is_empty());
    let class = primary_class(&document);
    assert!(matches!(
        &class.kind,
        NodeKind::ClassDeclaration { base_type: Some(base_type), .. } if base_type == "PageBase"
    ));
    let members = kinds(&class.children);
    assert_eq!(members[0], "MethodDeclaration");
    assert!(members.len() > 1);
    assert!(members[1..].iter().all(|kind| *kind == "CSharpCode"));
}

#[test]
fn test_process_many_keeps_order() {
    let engine = input_engine();
    let sources: Vec<RazorSourceDocument> = ["Pages/A.cshtml", "Pages/B.cshtml", "Pages/C.cshtml"]
        .iter()
        .map(|path| RazorSourceDocument::new("<p>@DateTime.Now</p>", Some(path)))
        .collect();

    let documents = engine.process_many(&sources, &[]);
    let class_names: Vec<String> = documents
        .iter()
        .map(|document| document.class_name().unwrap().to_string())
        .collect();
    assert_eq!(class_names, vec!["Pages_A", "Pages_B", "Pages_C"]);
}

#[test]
fn test_engine_from_configuration() {
    let config = RazorConfiguration::from_json(
        r#"{
            "rootNamespace": "MyApp.Pages",
            "directives": [
                { "name": "model", "kind": "singleLine", "usage": "fileScopedSinglyOccurring",
                  "tokens": [{ "kind": "type" }] }
            ]
        }"#,
    )
    .unwrap();
    let engine = RazorEngine::from_configuration(&config).unwrap();
    let document = process(&engine, "@model IndexModel\n<h1>@Model.Title</h1>");

    assert!(document.diagnostics().is_empty());
    let namespace = document
        .document_node()
        .find_annotated(AnnotationKey::PrimaryNamespace)
        .unwrap();
    assert!(matches!(
        &namespace.kind,
        NodeKind::NamespaceDeclaration { content } if content == "MyApp.Pages"
    ));
    assert_eq!(find(document.document_node(), "Directive").len(), 1);

    let twice = process(&engine, "@model A\n@model B\n");
    assert_eq!(ids(&twice), vec!["RZ2001"]);
}

#[test]
fn test_missing_file() {
    let engine = RazorEngine::builder().build().unwrap();
    let result = engine.process_file(Utf8Path::new("does/not/exist.cshtml"), &[]);
    assert!(matches!(result, Err(EngineError::ReadDocument { .. })));
}
