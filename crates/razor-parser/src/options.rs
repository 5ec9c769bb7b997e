//! Parser configuration.

use crate::directives::DirectiveDescriptor;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Razor language version. Gates individual parser features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RazorLanguageVersion {
    #[cfg_attr(feature = "serde", serde(rename = "1.0"))]
    V1_0,
    #[cfg_attr(feature = "serde", serde(rename = "1.1"))]
    V1_1,
    #[cfg_attr(feature = "serde", serde(rename = "2.0"))]
    V2_0,
    #[cfg_attr(feature = "serde", serde(rename = "2.1"))]
    V2_1,
    #[cfg_attr(feature = "serde", serde(rename = "3.0"))]
    V3_0,
}

impl RazorLanguageVersion {
    pub const LATEST: RazorLanguageVersion = RazorLanguageVersion::V3_0;

    pub fn as_str(&self) -> &'static str {
        match self {
            RazorLanguageVersion::V1_0 => "1.0",
            RazorLanguageVersion::V1_1 => "1.1",
            RazorLanguageVersion::V2_0 => "2.0",
            RazorLanguageVersion::V2_1 => "2.1",
            RazorLanguageVersion::V3_0 => "3.0",
        }
    }
}

impl fmt::Display for RazorLanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RazorLanguageVersion {
    type Err = UnknownLanguageVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(RazorLanguageVersion::V1_0),
            "1.1" => Ok(RazorLanguageVersion::V1_1),
            "2.0" => Ok(RazorLanguageVersion::V2_0),
            "2.1" => Ok(RazorLanguageVersion::V2_1),
            "3.0" => Ok(RazorLanguageVersion::V3_0),
            other => Err(UnknownLanguageVersion(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown Razor language version '{0}'")]
pub struct UnknownLanguageVersion(pub String);

/// Features switched on by a language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RazorParserFeatureFlags {
    pub allow_minimized_boolean_tag_helper_attributes: bool,
    pub allow_html_comments_in_tag_helpers: bool,
    /// `data-*` attributes get attribute blocks like any other attribute.
    pub allow_conditional_data_dash_attributes: bool,
}

impl RazorParserFeatureFlags {
    pub fn for_version(version: RazorLanguageVersion) -> Self {
        Self {
            allow_minimized_boolean_tag_helper_attributes: version >= RazorLanguageVersion::V2_1,
            allow_html_comments_in_tag_helpers: version >= RazorLanguageVersion::V2_1,
            allow_conditional_data_dash_attributes: version >= RazorLanguageVersion::V3_0,
        }
    }
}

/// Options threaded through parsing and the rewrite passes.
#[derive(Debug, Clone)]
pub struct RazorParserOptions {
    pub language_version: RazorLanguageVersion,
    /// Keep editor-oriented structure: no whitespace capture at the end of
    /// code-only lines.
    pub design_time: bool,
    /// Parse directives at the top of the document, then treat the rest as
    /// markup.
    pub parse_leading_directives: bool,
    /// Extensible directives in addition to the built-ins.
    pub directives: Vec<Arc<DirectiveDescriptor>>,
    pub feature_flags: RazorParserFeatureFlags,
}

impl Default for RazorParserOptions {
    fn default() -> Self {
        Self::new(RazorLanguageVersion::LATEST)
    }
}

impl RazorParserOptions {
    pub fn new(language_version: RazorLanguageVersion) -> Self {
        Self {
            language_version,
            design_time: false,
            parse_leading_directives: false,
            directives: Vec::new(),
            feature_flags: RazorParserFeatureFlags::for_version(language_version),
        }
    }

    pub fn with_design_time(mut self, design_time: bool) -> Self {
        self.design_time = design_time;
        self
    }

    pub fn with_parse_leading_directives(mut self, parse_leading_directives: bool) -> Self {
        self.parse_leading_directives = parse_leading_directives;
        self
    }

    pub fn with_directive(mut self, directive: Arc<DirectiveDescriptor>) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn with_directives(mut self, directives: impl IntoIterator<Item = Arc<DirectiveDescriptor>>) -> Self {
        self.directives.extend(directives);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_flags_by_version() {
        let v2 = RazorParserFeatureFlags::for_version(RazorLanguageVersion::V2_0);
        assert!(!v2.allow_minimized_boolean_tag_helper_attributes);
        assert!(!v2.allow_html_comments_in_tag_helpers);

        let v21 = RazorParserFeatureFlags::for_version(RazorLanguageVersion::V2_1);
        assert!(v21.allow_minimized_boolean_tag_helper_attributes);
        assert!(!v21.allow_conditional_data_dash_attributes);

        let v3 = RazorParserFeatureFlags::for_version(RazorLanguageVersion::V3_0);
        assert!(v3.allow_conditional_data_dash_attributes);
    }

    #[test]
    fn test_version_round_trip_through_str() {
        for version in ["1.0", "1.1", "2.0", "2.1", "3.0"] {
            let parsed: RazorLanguageVersion = version.parse().unwrap();
            assert_eq!(parsed.as_str(), version);
        }
        assert!("4.2".parse::<RazorLanguageVersion>().is_err());
    }
}
