use pretty_assertions::assert_eq;
use razor_parser::rewrite::rewrite_tag_helpers;
use razor_parser::syntax::{AttributeValueStyle, BlockKind, SyntaxNode, TagHelperInfo, TagMode};
use razor_parser::{parse, RazorLanguageVersion, RazorParserOptions, RazorSourceDocument, RazorSyntaxTree};
use razor_tag_helpers::{TagHelperBinder, TagHelperDescriptor, TagHelperDescriptorBuilder, TagStructure};
use smol_str::SmolStr;
use std::sync::Arc;

fn rewrite_with_version(
    text: &str,
    version: RazorLanguageVersion,
    prefix: Option<&str>,
    descriptors: Vec<TagHelperDescriptor>,
) -> (RazorSyntaxTree, RazorSyntaxTree) {
    let source = RazorSourceDocument::new(text, Some("TagHelpers.cshtml"));
    let parsed = parse(&source, &RazorParserOptions::new(version));
    let binder = TagHelperBinder::new(prefix.map(SmolStr::new), descriptors.into_iter().map(Arc::new));
    let rewritten = rewrite_tag_helpers(&parsed, &binder);
    (parsed, rewritten)
}

fn rewrite(text: &str, descriptors: Vec<TagHelperDescriptor>) -> RazorSyntaxTree {
    rewrite_with_version(text, RazorLanguageVersion::V3_0, None, descriptors).1
}

fn ids(tree: &RazorSyntaxTree) -> Vec<&'static str> {
    tree.all_diagnostics().iter().map(|d| d.id()).collect()
}

fn tag_helpers(tree: &RazorSyntaxTree) -> Vec<Arc<TagHelperInfo>> {
    tree.root_node()
        .descendants()
        .filter_map(|node| node.as_block().and_then(|block| block.generator.tag_helper().cloned()))
        .collect()
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
            attribute.name("checked").property_name("Checked").type_name("System.Boolean");
        })
        .bound_attribute(|attribute| {
            attribute.name("count").property_name("Count").type_name("System.Int32");
        })
        .build()
        .unwrap()
}

fn simple_helper(type_name: &str, tag_name: &str) -> TagHelperDescriptor {
    let tag_name = tag_name.to_string();
    TagHelperDescriptorBuilder::new(type_name, "TestAssembly")
        .tag_matching_rule(move |rule| {
            rule.require_tag_name(tag_name);
        })
        .build()
        .unwrap()
}

#[test]
fn test_self_closing_input_binds() {
    let tree = rewrite("<input class=\"x\" />", vec![input_helper()]);
    assert!(ids(&tree).is_empty());

    let root = tree.root();
    assert_eq!(root.children().len(), 1);
    let helper = root.children()[0].as_block().unwrap();
    assert_eq!(helper.kind, BlockKind::Tag);
    assert_eq!(helper.content(), "<input class=\"x\" />");

    let info = helper.generator.tag_helper().unwrap();
    assert_eq!(info.tag_name, "input");
    assert_eq!(info.tag_mode, TagMode::SelfClosing);
    assert_eq!(info.bound_attributes().count(), 1);
    assert_eq!(info.html_attributes().count(), 0);

    let class = &info.attributes[0];
    assert_eq!(class.name, "class");
    assert_eq!(class.value_style, AttributeValueStyle::DoubleQuotes);
    assert_eq!(class.value.as_ref().map(SyntaxNode::content).as_deref(), Some("x"));
    assert_eq!(class.matches[0].attribute.property_name, "Class");
}

#[test]
fn test_unbound_elements_are_untouched() {
    let (parsed, rewritten) = rewrite_with_version(
        "<p>hi <b>there</b></p>",
        RazorLanguageVersion::V3_0,
        None,
        vec![simple_helper("MyTagHelper", "my-tag")],
    );
    assert!(Arc::ptr_eq(parsed.root(), rewritten.root()));
    assert!(ids(&rewritten).is_empty());
}

#[test]
fn test_empty_binder_returns_same_tree() {
    let (parsed, rewritten) = rewrite_with_version("<my-tag></my-tag>", RazorLanguageVersion::V3_0, None, Vec::new());
    assert!(Arc::ptr_eq(parsed.root(), rewritten.root()));
}

#[test]
fn test_body_is_nested_under_tag_helper() {
    let tree = rewrite("<my-tag>a <b>b</b></my-tag> c", vec![simple_helper("MyTagHelper", "my-tag")]);
    assert!(ids(&tree).is_empty());

    let root = tree.root();
    assert_eq!(root.children().len(), 2);
    let helper = root.children()[0].as_block().unwrap();
    assert_eq!(helper.content(), "<my-tag>a <b>b</b></my-tag>");
    let info = helper.generator.tag_helper().unwrap();
    assert_eq!(info.tag_mode, TagMode::StartTagAndEndTag);
    assert_eq!(root.children()[1].content(), " c");
}

#[test]
fn test_nested_same_name_elements_pair_correctly() {
    let tree = rewrite(
        "<my-tag><my-tag>x</my-tag></my-tag>",
        vec![simple_helper("MyTagHelper", "my-tag")],
    );
    assert!(ids(&tree).is_empty());
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 2);
    assert_eq!(tree.root().children().len(), 1);
}

#[test]
fn test_parent_tag_requirement() {
    let strong = TagHelperDescriptorBuilder::new("StrongTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("strong").require_parent_tag("p");
        })
        .build()
        .unwrap();
    let tree = rewrite(
        "<p><strong>x</strong></p><div><strong>y</strong></div>",
        vec![strong],
    );
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 1);
    assert_eq!(helpers[0].binding.parent_tag_name.as_deref(), Some("p"));
}

#[test]
fn test_required_attribute_selects_elements() {
    let descriptor = TagHelperDescriptorBuilder::new("AnchorTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("a").require_attribute(|attribute| {
                attribute.name("asp-action");
            });
        })
        .build()
        .unwrap();
    let tree = rewrite("<a href=\"/\">x</a><a asp-action=\"Index\">y</a>", vec![descriptor]);
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 1);
    assert_eq!(helpers[0].html_attributes().count(), 1);
    assert_eq!(helpers[0].attributes[0].name, "asp-action");
}

#[test]
fn test_missing_end_tag_is_reported() {
    let tree = rewrite("<my-tag>text", vec![simple_helper("MyTagHelper", "my-tag")]);
    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ1035");
    assert_eq!(diagnostics[0].span.absolute_index, 1);
    assert_eq!(diagnostics[0].span.length, 6);

    // The rest of the siblings become the body.
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 1);
    assert_eq!(tree.root().children().len(), 1);
}

#[test]
fn test_without_end_tag_structure() {
    let descriptor = TagHelperDescriptorBuilder::new("InputTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("input")
                .require_tag_structure(TagStructure::WithoutEndTag);
        })
        .build()
        .unwrap();
    let tree = rewrite("<input></input>", vec![descriptor]);

    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 1);
    assert_eq!(helpers[0].tag_mode, TagMode::StartTagOnly);

    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ1034");
    assert_eq!(diagnostics[0].span.absolute_index, 9);
    assert_eq!(diagnostics[0].span.length, 5);
}

#[test]
fn test_minimized_boolean_attribute() {
    let (_, tree) = rewrite_with_version(
        "<input checked />",
        RazorLanguageVersion::V3_0,
        None,
        vec![input_helper()],
    );
    assert!(ids(&tree).is_empty());
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers[0].attributes[0].value_style, AttributeValueStyle::Minimized);
    assert!(helpers[0].attributes[0].value.is_none());

    let (_, old) = rewrite_with_version(
        "<input checked />",
        RazorLanguageVersion::V2_0,
        None,
        vec![input_helper()],
    );
    assert_eq!(ids(&old), vec!["RZ2008"]);
}

#[test]
fn test_minimized_non_boolean_attribute_needs_value() {
    let tree = rewrite("<input count />", vec![input_helper()]);
    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ2008");
    assert_eq!(diagnostics[0].span.absolute_index, 7);
    assert_eq!(diagnostics[0].span.length, 5);
    assert!(diagnostics[0].message().contains("System.Int32"));
}

#[test]
fn test_empty_string_attribute_is_allowed() {
    let tree = rewrite("<input class=\"\" />", vec![input_helper()]);
    assert!(ids(&tree).is_empty());
}

#[test]
fn test_dictionary_prefix_without_key() {
    let descriptor = TagHelperDescriptorBuilder::new("AnchorTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("a");
        })
        .bound_attribute(|attribute| {
            attribute
                .name("route")
                .property_name("Route")
                .type_name("System.Collections.Generic.IDictionary<System.String, System.String>")
                .as_dictionary("route-", "System.String");
        })
        .build()
        .unwrap();
    let tree = rewrite("<a route-=\"x\" route-id=\"1\"></a>", vec![descriptor]);

    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ2006");
    assert_eq!(diagnostics[0].span.absolute_index, 3);
    assert_eq!(diagnostics[0].span.length, 6);

    let helpers = tag_helpers(&tree);
    let attributes = &helpers[0].attributes;
    assert_eq!(attributes.len(), 2);
    assert!(!attributes[0].is_bound());
    assert!(attributes[1].is_bound());
    assert!(attributes[1].matches[0].is_indexer);
}

fn list_helper() -> TagHelperDescriptor {
    TagHelperDescriptorBuilder::new("ListTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("my-list");
        })
        .allow_child_tag("my-item")
        .build()
        .unwrap()
}

#[test]
fn test_disallowed_child_tag() {
    let tree = rewrite("<my-list><b>x</b></my-list>", vec![list_helper()]);
    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ2010");
    assert_eq!(diagnostics[0].span.absolute_index, 10);
    let message = diagnostics[0].message();
    assert!(message.contains("<b>"));
    assert!(message.contains("my-item"));
}

#[test]
fn test_text_content_in_restricted_parent() {
    let tree = rewrite("<my-list>hello<my-item></my-item></my-list>", vec![list_helper()]);
    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ2009");
    assert_eq!(diagnostics[0].span.absolute_index, 9);
    assert_eq!(diagnostics[0].span.length, 5);
}

#[test]
fn test_whitespace_in_restricted_parent_is_allowed() {
    let tree = rewrite("<my-list>\n  <my-item></my-item>\n</my-list>", vec![list_helper()]);
    assert!(ids(&tree).is_empty());
}

#[test]
fn test_code_in_start_tag() {
    let tree = rewrite("<my-tag @foo></my-tag>", vec![simple_helper("MyTagHelper", "my-tag")]);
    let diagnostics = tree.all_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), "RZ1031");
    assert_eq!(diagnostics[0].span.absolute_index, 1);
    assert_eq!(diagnostics[0].span.length, 6);
}

#[test]
fn test_prefix_is_required() {
    let (_, tree) = rewrite_with_version(
        "<th:input class=\"a\" /><input class=\"b\" />",
        RazorLanguageVersion::V3_0,
        Some("th:"),
        vec![input_helper()],
    );
    let helpers = tag_helpers(&tree);
    assert_eq!(helpers.len(), 1);
    assert_eq!(helpers[0].tag_name, "th:input");
    assert_eq!(helpers[0].binding.tag_name_without_prefix(), "input");
}

#[test]
fn test_descriptor_diagnostics_reported_once() {
    let descriptor = TagHelperDescriptorBuilder::new("BadTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("my-tag");
        })
        .bound_attribute(|attribute| {
            attribute.name("a@b").property_name("Ab").type_name("System.String");
        })
        .build()
        .unwrap();
    let unused = TagHelperDescriptorBuilder::new("UnusedTagHelper", "TestAssembly")
        .tag_matching_rule(|rule| {
            rule.require_tag_name("other!");
        })
        .build()
        .unwrap();

    let tree = rewrite("<my-tag></my-tag><my-tag></my-tag>", vec![descriptor, unused]);
    assert_eq!(ids(&tree), vec!["RZ3001"]);
    assert_eq!(tag_helpers(&tree).len(), 2);
}
