//! `@addTagHelper` / `@removeTagHelper` lookup text.

use crate::descriptor::TagHelperDescriptor;
use smol_str::SmolStr;

/// Parsed `"TypePattern, AssemblyName"` lookup text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupInfo {
    pub type_pattern: SmolStr,
    pub assembly_name: SmolStr,
}

impl LookupInfo {
    /// Parses lookup text. Returns `None` unless there are exactly two
    /// non-empty comma separated parts.
    pub fn parse(lookup_text: &str) -> Option<LookupInfo> {
        let mut parts = lookup_text.split(',');
        let type_pattern = parts.next()?.trim();
        let assembly_name = parts.next()?.trim();
        if parts.next().is_some() || type_pattern.is_empty() || assembly_name.is_empty() {
            return None;
        }
        Some(LookupInfo {
            type_pattern: type_pattern.into(),
            assembly_name: assembly_name.into(),
        })
    }

    /// Returns true if `descriptor` is selected by this lookup.
    ///
    /// The assembly must match exactly. A pattern ending in `*` matches type
    /// names by prefix; any other pattern must equal the type name.
    pub fn matches(&self, descriptor: &TagHelperDescriptor) -> bool {
        if descriptor.assembly_name != self.assembly_name {
            return false;
        }
        match self.type_pattern.strip_suffix('*') {
            Some(prefix) => descriptor.name.starts_with(prefix),
            None => descriptor.name == self.type_pattern,
        }
    }
}
