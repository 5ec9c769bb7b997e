//! Tag helper descriptors and binding.
//!
//! A tag helper is a custom element binding described by a
//! [`TagHelperDescriptor`]: the tags it targets (matching rules) and the
//! attributes that set its properties. Descriptors come from outside; this
//! crate validates them, resolves `@addTagHelper`-style lookups against them
//! and binds elements to them.

mod binder;
mod builder;
pub mod conventions;
mod descriptor;
mod lookup;

pub use binder::{TagHelperBinder, TagHelperBinding};
pub use builder::{
    find_invalid_name_character, BoundAttributeBuilder, DescriptorError, RequiredAttributeBuilder,
    TagHelperDescriptorBuilder, TagMatchingRuleBuilder, INVALID_NAME_CHARACTERS,
};
pub use descriptor::{
    AllowedChildTagDescriptor, BoundAttributeDescriptor, NameComparisonMode, RequiredAttributeDescriptor,
    TagHelperDescriptor, TagMatchingRuleDescriptor, TagStructure, ValueComparisonMode,
};
pub use lookup::LookupInfo;
