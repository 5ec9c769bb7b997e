//! Builders for [`TagHelperDescriptor`].
//!
//! Invalid names do not make `build` fail. They become descriptor
//! diagnostics which are reported wherever the descriptor binds. Only missing
//! identity (type or assembly name) is a hard error.

use crate::descriptor::*;
use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
use smol_str::SmolStr;
use source_map::SourceSpan;
use thiserror::Error;

/// Characters that may not appear in tag, attribute or prefix names.
pub const INVALID_NAME_CHARACTERS: &[char] =
    &['@', '!', '<', '/', '?', '[', '>', ']', '=', '"', '\'', '*'];

/// Returns the first character of `name` that is whitespace or otherwise
/// not allowed in an HTML name.
pub fn find_invalid_name_character(name: &str) -> Option<char> {
    name.chars()
        .find(|c| c.is_whitespace() || INVALID_NAME_CHARACTERS.contains(c))
}

/// Programmer errors when constructing a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("tag helper type name must not be empty")]
    MissingTypeName,
    #[error("tag helper '{0}' has no assembly name")]
    MissingAssemblyName(SmolStr),
    #[error("bound attribute on '{0}' has no property name")]
    MissingPropertyName(SmolStr),
}

fn diagnostic(code: DiagnosticCode, args: &[&str]) -> RazorDiagnostic {
    RazorDiagnostic::new(code, SourceSpan::UNDEFINED, args)
}

/// Builds a [`TagHelperDescriptor`].
///
/// ```
/// use razor_tag_helpers::TagHelperDescriptorBuilder;
///
/// let descriptor = TagHelperDescriptorBuilder::new("InputTagHelper", "TestAssembly")
///     .tag_matching_rule(|rule| {
///         rule.require_tag_name("input");
///     })
///     .bound_attribute(|attribute| {
///         attribute.name("class").property_name("Class").type_name("System.String");
///     })
///     .build()
///     .unwrap();
/// assert!(descriptor.all_diagnostics().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TagHelperDescriptorBuilder {
    name: SmolStr,
    assembly_name: SmolStr,
    display_name: Option<SmolStr>,
    documentation: Option<String>,
    tag_output_hint: Option<SmolStr>,
    rules: Vec<TagMatchingRuleBuilder>,
    attributes: Vec<BoundAttributeBuilder>,
    allowed_children: Vec<SmolStr>,
}

impl TagHelperDescriptorBuilder {
    pub fn new(type_name: impl Into<SmolStr>, assembly_name: impl Into<SmolStr>) -> Self {
        Self {
            name: type_name.into(),
            assembly_name: assembly_name.into(),
            display_name: None,
            documentation: None,
            tag_output_hint: None,
            rules: Vec::new(),
            attributes: Vec::new(),
            allowed_children: Vec::new(),
        }
    }

    pub fn display_name(mut self, display_name: impl Into<SmolStr>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn tag_output_hint(mut self, hint: impl Into<SmolStr>) -> Self {
        self.tag_output_hint = Some(hint.into());
        self
    }

    pub fn tag_matching_rule(mut self, configure: impl FnOnce(&mut TagMatchingRuleBuilder)) -> Self {
        let mut rule = TagMatchingRuleBuilder::default();
        configure(&mut rule);
        self.rules.push(rule);
        self
    }

    pub fn bound_attribute(mut self, configure: impl FnOnce(&mut BoundAttributeBuilder)) -> Self {
        let mut attribute = BoundAttributeBuilder::default();
        configure(&mut attribute);
        self.attributes.push(attribute);
        self
    }

    pub fn allow_child_tag(mut self, name: impl Into<SmolStr>) -> Self {
        self.allowed_children.push(name.into());
        self
    }

    pub fn build(self) -> Result<TagHelperDescriptor, DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::MissingTypeName);
        }
        if self.assembly_name.trim().is_empty() {
            return Err(DescriptorError::MissingAssemblyName(self.name));
        }

        let bound_attributes = self
            .attributes
            .into_iter()
            .map(|attribute| attribute.build(&self.name))
            .collect::<Result<Vec<_>, _>>()?;

        let allowed_child_tags = self
            .allowed_children
            .into_iter()
            .map(|name| {
                let mut diagnostics = Vec::new();
                if name.trim().is_empty() {
                    diagnostics.push(diagnostic(
                        DiagnosticCode::InvalidRestrictedChildNullOrWhitespace,
                        &[self.name.as_str()],
                    ));
                } else if let Some(c) = find_invalid_name_character(&name) {
                    diagnostics.push(diagnostic(
                        DiagnosticCode::InvalidRestrictedChild,
                        &[name.as_str(), self.name.as_str(), c.to_string().as_str()],
                    ));
                }
                AllowedChildTagDescriptor {
                    display_name: name.clone(),
                    name,
                    diagnostics,
                }
            })
            .collect();

        Ok(TagHelperDescriptor {
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            assembly_name: self.assembly_name,
            documentation: self.documentation,
            tag_output_hint: self.tag_output_hint,
            tag_matching_rules: self.rules.into_iter().map(TagMatchingRuleBuilder::build).collect(),
            bound_attributes,
            allowed_child_tags,
            diagnostics: Vec::new(),
        })
    }
}

/// Builds a [`TagMatchingRuleDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct TagMatchingRuleBuilder {
    tag_name: SmolStr,
    parent_tag: Option<SmolStr>,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttributeBuilder>,
}

impl TagMatchingRuleBuilder {
    pub fn require_tag_name(&mut self, tag_name: impl Into<SmolStr>) -> &mut Self {
        self.tag_name = tag_name.into();
        self
    }

    pub fn require_parent_tag(&mut self, parent_tag: impl Into<SmolStr>) -> &mut Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    pub fn require_tag_structure(&mut self, tag_structure: TagStructure) -> &mut Self {
        self.tag_structure = tag_structure;
        self
    }

    pub fn require_attribute(&mut self, configure: impl FnOnce(&mut RequiredAttributeBuilder)) -> &mut Self {
        let mut attribute = RequiredAttributeBuilder::default();
        configure(&mut attribute);
        self.attributes.push(attribute);
        self
    }

    fn build(self) -> TagMatchingRuleDescriptor {
        let mut diagnostics = Vec::new();
        if self.tag_name.trim().is_empty() {
            diagnostics.push(diagnostic(
                DiagnosticCode::InvalidTargetedTagNameNullOrWhitespace,
                &[],
            ));
        } else if self.tag_name != "*" {
            if let Some(c) = find_invalid_name_character(&self.tag_name) {
                diagnostics.push(diagnostic(
                    DiagnosticCode::InvalidTargetedTagName,
                    &[self.tag_name.as_str(), c.to_string().as_str()],
                ));
            }
        }
        if let Some(parent) = &self.parent_tag {
            if let Some(c) = find_invalid_name_character(parent) {
                diagnostics.push(diagnostic(
                    DiagnosticCode::InvalidTargetedParentTagName,
                    &[parent.as_str(), c.to_string().as_str()],
                ));
            }
        }

        TagMatchingRuleDescriptor {
            tag_name: self.tag_name,
            parent_tag: self.parent_tag,
            tag_structure: self.tag_structure,
            attributes: self
                .attributes
                .into_iter()
                .map(RequiredAttributeBuilder::build)
                .collect(),
            diagnostics,
        }
    }
}

/// Builds a [`RequiredAttributeDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct RequiredAttributeBuilder {
    name: SmolStr,
    name_comparison: NameComparisonMode,
    value: Option<SmolStr>,
    value_comparison: ValueComparisonMode,
}

impl RequiredAttributeBuilder {
    pub fn name(&mut self, name: impl Into<SmolStr>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn name_comparison(&mut self, mode: NameComparisonMode) -> &mut Self {
        self.name_comparison = mode;
        self
    }

    pub fn value(&mut self, value: impl Into<SmolStr>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    pub fn value_comparison(&mut self, mode: ValueComparisonMode) -> &mut Self {
        self.value_comparison = mode;
        self
    }

    fn build(self) -> RequiredAttributeDescriptor {
        let mut diagnostics = Vec::new();
        if self.name.trim().is_empty() {
            diagnostics.push(diagnostic(
                DiagnosticCode::InvalidTargetedAttributeNameNullOrWhitespace,
                &[],
            ));
        } else if let Some(c) = find_invalid_name_character(&self.name) {
            diagnostics.push(diagnostic(
                DiagnosticCode::InvalidTargetedAttributeName,
                &[self.name.as_str(), c.to_string().as_str()],
            ));
        }

        let display_name = match self.name_comparison {
            NameComparisonMode::FullMatch => self.name.clone(),
            NameComparisonMode::PrefixMatch => SmolStr::new(format!("{}...", self.name)),
        };
        RequiredAttributeDescriptor {
            name: self.name,
            name_comparison: self.name_comparison,
            value: self.value,
            value_comparison: self.value_comparison,
            display_name,
            diagnostics,
        }
    }
}

/// Builds a [`BoundAttributeDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct BoundAttributeBuilder {
    name: SmolStr,
    property_name: SmolStr,
    type_name: SmolStr,
    is_enum: bool,
    indexer_name_prefix: Option<SmolStr>,
    indexer_type_name: Option<SmolStr>,
    documentation: Option<String>,
}

impl BoundAttributeBuilder {
    pub fn name(&mut self, name: impl Into<SmolStr>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn property_name(&mut self, property_name: impl Into<SmolStr>) -> &mut Self {
        self.property_name = property_name.into();
        self
    }

    pub fn type_name(&mut self, type_name: impl Into<SmolStr>) -> &mut Self {
        self.type_name = type_name.into();
        self
    }

    pub fn is_enum(&mut self, is_enum: bool) -> &mut Self {
        self.is_enum = is_enum;
        self
    }

    /// Makes the attribute a dictionary: any attribute starting with
    /// `prefix` sets an entry keyed by the rest of the name.
    pub fn as_dictionary(&mut self, prefix: impl Into<SmolStr>, value_type: impl Into<SmolStr>) -> &mut Self {
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(value_type.into());
        self
    }

    pub fn documentation(&mut self, documentation: impl Into<String>) -> &mut Self {
        self.documentation = Some(documentation.into());
        self
    }

    fn build(self, helper: &str) -> Result<BoundAttributeDescriptor, DescriptorError> {
        if self.property_name.trim().is_empty() {
            return Err(DescriptorError::MissingPropertyName(helper.into()));
        }

        let mut diagnostics = Vec::new();
        let property = self.property_name.as_str();
        if self.name.trim().is_empty() {
            // A dictionary-only attribute may leave the name empty.
            if self.indexer_name_prefix.is_none() {
                diagnostics.push(diagnostic(
                    DiagnosticCode::InvalidBoundAttributeNullOrWhitespace,
                    &[property, helper],
                ));
            }
        } else if self
            .name
            .get(..5)
            .is_some_and(|start| start.eq_ignore_ascii_case("data-"))
        {
            diagnostics.push(diagnostic(
                DiagnosticCode::InvalidBoundAttributeNameStartsWith,
                &[property, helper, self.name.as_str(), "data-"],
            ));
        } else if let Some(c) = find_invalid_name_character(&self.name) {
            diagnostics.push(diagnostic(
                DiagnosticCode::InvalidBoundAttributeName,
                &[property, helper, self.name.as_str(), c.to_string().as_str()],
            ));
        }

        if let Some(prefix) = &self.indexer_name_prefix {
            if let Some(c) = find_invalid_name_character(prefix) {
                diagnostics.push(diagnostic(
                    DiagnosticCode::InvalidBoundAttributePrefix,
                    &[property, helper, prefix.as_str(), c.to_string().as_str()],
                ));
            }
        }

        Ok(BoundAttributeDescriptor {
            display_name: SmolStr::new(format!("{} {}.{}", self.type_name, helper, property)),
            name: self.name,
            property_name: self.property_name,
            type_name: self.type_name,
            is_enum: self.is_enum,
            indexer_name_prefix: self.indexer_name_prefix,
            indexer_type_name: self.indexer_type_name,
            documentation: self.documentation,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn codes(descriptor: &TagHelperDescriptor) -> Vec<&'static str> {
        descriptor.all_diagnostics().iter().map(|d| d.id()).collect()
    }

    #[test]
    fn test_missing_identity_is_an_error() {
        assert_eq!(
            TagHelperDescriptorBuilder::new("", "A").build(),
            Err(DescriptorError::MissingTypeName)
        );
        assert_eq!(
            TagHelperDescriptorBuilder::new("Foo", " ").build(),
            Err(DescriptorError::MissingAssemblyName("Foo".into()))
        );
    }

    #[test]
    fn test_invalid_tag_name_character() {
        let descriptor = TagHelperDescriptorBuilder::new("Foo", "A")
            .tag_matching_rule(|rule| {
                rule.require_tag_name("my!tag");
            })
            .build()
            .unwrap();
        assert_eq!(codes(&descriptor), vec!["RZ3005"]);
        assert!(descriptor.has_errors());
    }

    #[test]
    fn test_catch_all_tag_name_is_valid() {
        let descriptor = TagHelperDescriptorBuilder::new("Foo", "A")
            .tag_matching_rule(|rule| {
                rule.require_tag_name("*").require_attribute(|a| {
                    a.name("asp-*");
                });
            })
            .build()
            .unwrap();
        assert_eq!(codes(&descriptor), vec!["RZ3008"]);
    }

    #[test]
    fn test_bound_attribute_validation() {
        let descriptor = TagHelperDescriptorBuilder::new("Foo", "A")
            .tag_matching_rule(|rule| {
                rule.require_tag_name("foo");
            })
            .bound_attribute(|a| {
                a.name("data-foo").property_name("Foo").type_name("string");
            })
            .bound_attribute(|a| {
                a.name("bar")
                    .property_name("Bar")
                    .type_name("System.Collections.Generic.IDictionary<string, string>")
                    .as_dictionary("bar prefix-", "string");
            })
            .build()
            .unwrap();
        assert_eq!(codes(&descriptor), vec!["RZ3002", "RZ3004"]);
    }

    #[test]
    fn test_prefix_match_display_name() {
        let descriptor = TagHelperDescriptorBuilder::new("Foo", "A")
            .tag_matching_rule(|rule| {
                rule.require_tag_name("a").require_attribute(|a| {
                    a.name("asp-route-")
                        .name_comparison(NameComparisonMode::PrefixMatch);
                });
            })
            .build()
            .unwrap();
        assert_eq!(
            descriptor.tag_matching_rules[0].attributes[0].display_name,
            "asp-route-..."
        );
    }

    #[test]
    fn test_structural_equality() {
        let build = || {
            TagHelperDescriptorBuilder::new("Foo", "A")
                .tag_matching_rule(|rule| {
                    rule.require_tag_name("foo");
                })
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
