//! Engine configuration.

use crate::error::EngineError;
use camino::Utf8Path;
use razor_ir::CodeGenerationOptions;
use razor_parser::{
    DirectiveDescriptor, DirectiveError, DirectiveKind, DirectiveUsage, RazorLanguageVersion, RazorParserOptions,
};
use serde::Deserialize;
use std::fs;
use std::sync::Arc;

/// Settings for a [`RazorEngine`](crate::RazorEngine), usually read from a
/// `razor.json` file.
///
/// ```json
/// {
///   "languageVersion": "3.0",
///   "rootNamespace": "MyApp.Pages",
///   "directives": [
///     { "name": "model", "kind": "singleLine", "tokens": [{ "kind": "type" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RazorConfiguration {
    pub language_version: RazorLanguageVersion,
    pub design_time: bool,
    pub parse_leading_directives: bool,
    pub root_namespace: String,
    /// Derived from each document's path when absent.
    pub class_name: Option<String>,
    pub base_type: Option<String>,
    pub method_name: String,
    /// Directives in addition to the built-in ones.
    pub directives: Vec<DirectiveConfiguration>,
}

impl Default for RazorConfiguration {
    fn default() -> Self {
        let options = CodeGenerationOptions::default();
        Self {
            language_version: RazorLanguageVersion::LATEST,
            design_time: false,
            parse_leading_directives: false,
            root_namespace: options.root_namespace.to_string(),
            class_name: None,
            base_type: None,
            method_name: options.method_name.to_string(),
            directives: Vec::new(),
        }
    }
}

impl RazorConfiguration {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Utf8Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path).map_err(|source| EngineError::ReadConfiguration {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn directive_descriptors(&self) -> Result<Vec<Arc<DirectiveDescriptor>>, DirectiveError> {
        self.directives
            .iter()
            .map(|directive| directive.to_descriptor().map(Arc::new))
            .collect()
    }

    pub fn parser_options(&self) -> Result<RazorParserOptions, EngineError> {
        Ok(RazorParserOptions::new(self.language_version)
            .with_design_time(self.design_time)
            .with_parse_leading_directives(self.parse_leading_directives)
            .with_directives(self.directive_descriptors()?))
    }

    pub fn code_generation_options(&self) -> CodeGenerationOptions {
        let mut options = CodeGenerationOptions::default().with_root_namespace(self.root_namespace.as_str());
        options.method_name = self.method_name.as_str().into();
        if let Some(class_name) = &self.class_name {
            options = options.with_class_name(class_name.as_str());
        }
        if let Some(base_type) = &self.base_type {
            options = options.with_base_type(base_type.as_str());
        }
        options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveConfiguration {
    pub name: String,
    pub kind: DirectiveKindConfiguration,
    #[serde(default)]
    pub usage: DirectiveUsageConfiguration,
    #[serde(default)]
    pub tokens: Vec<DirectiveTokenConfiguration>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectiveKindConfiguration {
    SingleLine,
    CodeBlock,
    RazorBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectiveUsageConfiguration {
    #[default]
    Unrestricted,
    FileScopedSinglyOccurring,
    FileScopedMultipleOccurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectiveTokenKindConfiguration {
    Type,
    Member,
    Namespace,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DirectiveTokenConfiguration {
    pub kind: DirectiveTokenKindConfiguration,
    #[serde(default)]
    pub optional: bool,
}

impl DirectiveConfiguration {
    pub fn to_descriptor(&self) -> Result<DirectiveDescriptor, DirectiveError> {
        let kind = match self.kind {
            DirectiveKindConfiguration::SingleLine => DirectiveKind::SingleLine,
            DirectiveKindConfiguration::CodeBlock => DirectiveKind::CodeBlock,
            DirectiveKindConfiguration::RazorBlock => DirectiveKind::RazorBlock,
        };
        let usage = match self.usage {
            DirectiveUsageConfiguration::Unrestricted => DirectiveUsage::Unrestricted,
            DirectiveUsageConfiguration::FileScopedSinglyOccurring => DirectiveUsage::FileScopedSinglyOccurring,
            DirectiveUsageConfiguration::FileScopedMultipleOccurring => DirectiveUsage::FileScopedMultipleOccurring,
        };

        DirectiveDescriptor::create_directive(&self.name, kind, |builder| {
            builder.usage(usage);
            if let Some(description) = &self.description {
                builder.description(description.clone());
            }
            for token in &self.tokens {
                match (token.kind, token.optional) {
                    (DirectiveTokenKindConfiguration::Type, false) => builder.add_type_token(),
                    (DirectiveTokenKindConfiguration::Type, true) => builder.add_optional_type_token(),
                    (DirectiveTokenKindConfiguration::Member, false) => builder.add_member_token(),
                    (DirectiveTokenKindConfiguration::Member, true) => builder.add_optional_member_token(),
                    (DirectiveTokenKindConfiguration::Namespace, false) => builder.add_namespace_token(),
                    (DirectiveTokenKindConfiguration::Namespace, true) => builder.add_optional_namespace_token(),
                    (DirectiveTokenKindConfiguration::String, false) => builder.add_string_token(),
                    (DirectiveTokenKindConfiguration::String, true) => builder.add_optional_string_token(),
                };
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use razor_parser::DirectiveTokenKind;

    #[test]
    fn test_defaults() {
        let config = RazorConfiguration::from_json("{}").unwrap();
        assert_eq!(config, RazorConfiguration::default());
        assert_eq!(config.language_version, RazorLanguageVersion::V3_0);
        assert_eq!(config.method_name, "ExecuteAsync");
    }

    #[test]
    fn test_directives_from_json() {
        let config = RazorConfiguration::from_json(
            r#"{
                "languageVersion": "2.1",
                "designTime": true,
                "rootNamespace": "MyApp.Pages",
                "directives": [
                    { "name": "model", "kind": "singleLine", "usage": "fileScopedSinglyOccurring",
                      "tokens": [{ "kind": "type" }] },
                    { "name": "slot", "kind": "razorBlock", "tokens": [{ "kind": "string", "optional": true }] }
                ]
            }"#,
        )
        .unwrap();

        let options = config.parser_options().unwrap();
        assert_eq!(options.language_version, RazorLanguageVersion::V2_1);
        assert!(options.design_time);
        assert_eq!(options.directives.len(), 2);

        let model = &options.directives[0];
        assert_eq!(model.directive, "model");
        assert_eq!(model.usage, DirectiveUsage::FileScopedSinglyOccurring);
        assert_eq!(model.tokens[0].kind, DirectiveTokenKind::Type);

        let slot = &options.directives[1];
        assert_eq!(slot.kind, DirectiveKind::RazorBlock);
        assert!(slot.tokens[0].optional);

        assert_eq!(config.code_generation_options().root_namespace, "MyApp.Pages");
    }

    #[test]
    fn test_invalid_directive_name() {
        let config = RazorConfiguration::from_json(r#"{ "directives": [{ "name": "bad name", "kind": "singleLine" }] }"#)
            .unwrap();
        assert!(matches!(config.parser_options(), Err(EngineError::InvalidDirective(_))));
    }

    #[test]
    fn test_unknown_fields_are_rejected_by_type() {
        assert!(RazorConfiguration::from_json(r#"{ "languageVersion": "9.9" }"#).is_err());
    }
}
