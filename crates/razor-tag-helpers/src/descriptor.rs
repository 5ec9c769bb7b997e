//! Tag helper descriptor types.
//!
//! Descriptors are built once (see [`crate::TagHelperDescriptorBuilder`]) and
//! then shared read-only. Equality is structural so descriptor sets coming
//! from different compilations can be compared and deduplicated.

use razor_diagnostics::RazorDiagnostic;
use smol_str::SmolStr;

/// Describes a custom element binding: which tags it targets and which
/// attributes map onto properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagHelperDescriptor {
    /// Fully qualified type name, e.g. `Microsoft.AspNetCore.Mvc.InputTagHelper`.
    pub name: SmolStr,
    pub assembly_name: SmolStr,
    pub display_name: SmolStr,
    pub documentation: Option<String>,
    /// Tag name the helper renders instead of its own, if any.
    pub tag_output_hint: Option<SmolStr>,
    pub tag_matching_rules: Vec<TagMatchingRuleDescriptor>,
    pub bound_attributes: Vec<BoundAttributeDescriptor>,
    pub allowed_child_tags: Vec<AllowedChildTagDescriptor>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl TagHelperDescriptor {
    /// Returns the diagnostics of this descriptor and all of its parts.
    pub fn all_diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut all = Vec::new();
        for child in &self.allowed_child_tags {
            all.extend(child.diagnostics.iter().cloned());
        }
        for attribute in &self.bound_attributes {
            all.extend(attribute.diagnostics.iter().cloned());
        }
        for rule in &self.tag_matching_rules {
            all.extend(rule.all_diagnostics());
        }
        all.extend(self.diagnostics.iter().cloned());
        all
    }

    pub fn has_errors(&self) -> bool {
        razor_diagnostics::has_errors(&self.all_diagnostics())
    }

    /// Returns true if the helper restricts its children.
    pub fn restricts_children(&self) -> bool {
        !self.allowed_child_tags.is_empty()
    }
}

/// One way a tag helper can match an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagMatchingRuleDescriptor {
    /// Tag name to match, or `*` for any tag.
    pub tag_name: SmolStr,
    pub parent_tag: Option<SmolStr>,
    pub tag_structure: TagStructure,
    pub attributes: Vec<RequiredAttributeDescriptor>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl TagMatchingRuleDescriptor {
    pub fn all_diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut all: Vec<_> = self
            .attributes
            .iter()
            .flat_map(|a| a.diagnostics.iter().cloned())
            .collect();
        all.extend(self.diagnostics.iter().cloned());
        all
    }
}

/// How an element targeted by a rule may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TagStructure {
    #[default]
    Unspecified,
    /// `<x></x>` or `<x />`.
    NormalOrSelfClosing,
    /// `<x>` or `<x />`; an end tag is an error.
    WithoutEndTag,
}

/// An attribute an element must carry for a rule to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequiredAttributeDescriptor {
    pub name: SmolStr,
    pub name_comparison: NameComparisonMode,
    pub value: Option<SmolStr>,
    pub value_comparison: ValueComparisonMode,
    pub display_name: SmolStr,
    pub diagnostics: Vec<RazorDiagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameComparisonMode {
    #[default]
    FullMatch,
    PrefixMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueComparisonMode {
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

/// An HTML attribute that sets a property on the tag helper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundAttributeDescriptor {
    /// HTML attribute name.
    pub name: SmolStr,
    pub property_name: SmolStr,
    pub type_name: SmolStr,
    pub is_enum: bool,
    /// Prefix for dictionary-style attributes, e.g. `asp-route-`.
    pub indexer_name_prefix: Option<SmolStr>,
    pub indexer_type_name: Option<SmolStr>,
    pub documentation: Option<String>,
    pub display_name: SmolStr,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl BoundAttributeDescriptor {
    pub fn is_boolean_property(&self) -> bool {
        is_boolean_type(&self.type_name)
    }

    pub fn is_string_property(&self) -> bool {
        is_string_type(&self.type_name)
    }

    pub fn is_indexer_boolean_property(&self) -> bool {
        self.indexer_type_name.as_deref().is_some_and(is_boolean_type)
    }

    pub fn is_indexer_string_property(&self) -> bool {
        self.indexer_type_name.as_deref().is_some_and(is_string_type)
    }

    pub fn has_indexer(&self) -> bool {
        self.indexer_name_prefix.is_some()
    }
}

fn is_boolean_type(name: &str) -> bool {
    matches!(name, "System.Boolean" | "bool")
}

fn is_string_type(name: &str) -> bool {
    matches!(name, "System.String" | "string")
}

/// A child tag a restricting tag helper accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllowedChildTagDescriptor {
    pub name: SmolStr,
    pub display_name: SmolStr,
    pub diagnostics: Vec<RazorDiagnostic>,
}
