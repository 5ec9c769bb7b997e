//! Data attached to blocks that the tag helper rewriter produced.

use super::node::SyntaxNode;
use razor_tag_helpers::{BoundAttributeDescriptor, TagHelperBinding, TagHelperDescriptor};
use smol_str::SmolStr;
use std::sync::Arc;

/// How an element bound to tag helpers was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagMode {
    StartTagAndEndTag,
    SelfClosing,
    /// `<x>` with no end tag, allowed by `TagStructure::WithoutEndTag`.
    StartTagOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeValueStyle {
    DoubleQuotes,
    SingleQuotes,
    NoQuotes,
    /// No `=value` at all.
    Minimized,
}

/// A bound attribute a physical attribute sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAttributeMatch {
    pub descriptor: Arc<TagHelperDescriptor>,
    pub attribute: BoundAttributeDescriptor,
    /// Set through the dictionary prefix rather than the full name.
    pub is_indexer: bool,
}

/// One attribute of a tag helper element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperAttributeNode {
    pub name: SmolStr,
    /// The value without quotes; `None` when minimized.
    pub value: Option<SyntaxNode>,
    pub value_style: AttributeValueStyle,
    /// Empty for plain HTML attributes.
    pub matches: Vec<BoundAttributeMatch>,
}

impl TagHelperAttributeNode {
    pub fn is_bound(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Everything known about an element bound to tag helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperInfo {
    pub tag_name: SmolStr,
    pub tag_mode: TagMode,
    pub binding: TagHelperBinding,
    pub attributes: Vec<TagHelperAttributeNode>,
}

impl TagHelperInfo {
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> {
        self.binding.descriptors()
    }

    pub fn bound_attributes(&self) -> impl Iterator<Item = &TagHelperAttributeNode> {
        self.attributes.iter().filter(|attribute| attribute.is_bound())
    }

    pub fn html_attributes(&self) -> impl Iterator<Item = &TagHelperAttributeNode> {
        self.attributes.iter().filter(|attribute| !attribute.is_bound())
    }
}
