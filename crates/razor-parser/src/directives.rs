//! Directive descriptors.
//!
//! A directive is `@name` followed by a fixed sequence of tokens and,
//! depending on its [`DirectiveKind`], a `{ }` body. The parser drives its
//! directive handling entirely from these descriptors.

use smol_str::SmolStr;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

pub const INHERITS_DIRECTIVE: &str = "inherits";
pub const FUNCTIONS_DIRECTIVE: &str = "functions";
pub const SECTION_DIRECTIVE: &str = "section";
pub const ADD_TAG_HELPER_DIRECTIVE: &str = "addTagHelper";
pub const REMOVE_TAG_HELPER_DIRECTIVE: &str = "removeTagHelper";
pub const TAG_HELPER_PREFIX_DIRECTIVE: &str = "tagHelperPrefix";

/// How the body of a directive ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Ends at the end of the line.
    SingleLine,
    /// Followed by a `{ }` markup region.
    RazorBlock,
    /// Followed by a `{ }` code region.
    CodeBlock,
}

/// Where and how often a directive may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirectiveUsage {
    #[default]
    Unrestricted,
    FileScopedSinglyOccurring,
    FileScopedMultipleOccurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveTokenKind {
    Type,
    Namespace,
    Member,
    String,
}

impl fmt::Display for DirectiveTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectiveTokenKind::Type => "type name",
            DirectiveTokenKind::Namespace => "namespace",
            DirectiveTokenKind::Member => "identifier",
            DirectiveTokenKind::String => "string",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveTokenDescriptor {
    pub kind: DirectiveTokenKind,
    pub optional: bool,
    pub name: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveDescriptor {
    pub directive: SmolStr,
    pub kind: DirectiveKind,
    pub usage: DirectiveUsage,
    pub tokens: Vec<DirectiveTokenDescriptor>,
    pub description: Option<String>,
}

/// Invalid directive declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("directive name must not be empty")]
    EmptyName,
    #[error("directive name '{0}' must only contain letters, digits or '_'")]
    InvalidName(SmolStr),
    #[error("directive '{0}' declares a required token after an optional one")]
    RequiredTokenAfterOptional(SmolStr),
}

impl DirectiveDescriptor {
    /// Builds a directive, validating its name and token list.
    ///
    /// ```
    /// use razor_parser::{DirectiveDescriptor, DirectiveKind};
    ///
    /// let custom = DirectiveDescriptor::create_directive("custom", DirectiveKind::SingleLine, |builder| {
    ///     builder.add_string_token();
    /// })
    /// .unwrap();
    /// assert_eq!(custom.tokens.len(), 1);
    /// ```
    pub fn create_directive(
        name: &str,
        kind: DirectiveKind,
        configure: impl FnOnce(&mut DirectiveDescriptorBuilder),
    ) -> Result<DirectiveDescriptor, DirectiveError> {
        let mut builder = DirectiveDescriptorBuilder {
            usage: DirectiveUsage::Unrestricted,
            tokens: Vec::new(),
            description: None,
        };
        configure(&mut builder);
        builder.build(name, kind)
    }

    pub fn create_single_line_directive(
        name: &str,
        configure: impl FnOnce(&mut DirectiveDescriptorBuilder),
    ) -> Result<DirectiveDescriptor, DirectiveError> {
        Self::create_directive(name, DirectiveKind::SingleLine, configure)
    }

    pub fn create_razor_block_directive(
        name: &str,
        configure: impl FnOnce(&mut DirectiveDescriptorBuilder),
    ) -> Result<DirectiveDescriptor, DirectiveError> {
        Self::create_directive(name, DirectiveKind::RazorBlock, configure)
    }

    pub fn create_code_block_directive(
        name: &str,
        configure: impl FnOnce(&mut DirectiveDescriptorBuilder),
    ) -> Result<DirectiveDescriptor, DirectiveError> {
        Self::create_directive(name, DirectiveKind::CodeBlock, configure)
    }
}

/// Declares the token list of a directive.
#[derive(Debug)]
pub struct DirectiveDescriptorBuilder {
    usage: DirectiveUsage,
    tokens: Vec<DirectiveTokenDescriptor>,
    description: Option<String>,
}

impl DirectiveDescriptorBuilder {
    fn token(&mut self, kind: DirectiveTokenKind, optional: bool) -> &mut Self {
        self.tokens.push(DirectiveTokenDescriptor {
            kind,
            optional,
            name: None,
        });
        self
    }

    pub fn add_type_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Type, false)
    }

    pub fn add_member_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Member, false)
    }

    pub fn add_namespace_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Namespace, false)
    }

    pub fn add_string_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::String, false)
    }

    pub fn add_optional_type_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Type, true)
    }

    pub fn add_optional_member_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Member, true)
    }

    pub fn add_optional_namespace_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::Namespace, true)
    }

    pub fn add_optional_string_token(&mut self) -> &mut Self {
        self.token(DirectiveTokenKind::String, true)
    }

    /// Names the most recently added token.
    pub fn named(&mut self, name: impl Into<SmolStr>) -> &mut Self {
        if let Some(token) = self.tokens.last_mut() {
            token.name = Some(name.into());
        }
        self
    }

    pub fn usage(&mut self, usage: DirectiveUsage) -> &mut Self {
        self.usage = usage;
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    fn build(self, name: &str, kind: DirectiveKind) -> Result<DirectiveDescriptor, DirectiveError> {
        if name.is_empty() {
            return Err(DirectiveError::EmptyName);
        }
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(DirectiveError::InvalidName(name.into()));
        }
        let mut seen_optional = false;
        for token in &self.tokens {
            if token.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(DirectiveError::RequiredTokenAfterOptional(name.into()));
            }
        }
        Ok(DirectiveDescriptor {
            directive: name.into(),
            kind,
            usage: self.usage,
            tokens: self.tokens,
            description: self.description,
        })
    }
}

/// `@inherits`, `@functions` and `@section`, always known to the parser.
pub fn builtin_directives() -> &'static [Arc<DirectiveDescriptor>] {
    static BUILTINS: OnceLock<Vec<Arc<DirectiveDescriptor>>> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        let inherits = DirectiveDescriptor {
            directive: INHERITS_DIRECTIVE.into(),
            kind: DirectiveKind::SingleLine,
            usage: DirectiveUsage::FileScopedSinglyOccurring,
            tokens: vec![DirectiveTokenDescriptor {
                kind: DirectiveTokenKind::Type,
                optional: false,
                name: Some("TypeName".into()),
            }],
            description: Some("Specify the base class of the generated type.".into()),
        };
        let functions = DirectiveDescriptor {
            directive: FUNCTIONS_DIRECTIVE.into(),
            kind: DirectiveKind::CodeBlock,
            usage: DirectiveUsage::Unrestricted,
            tokens: Vec::new(),
            description: Some("Specify a C# code block.".into()),
        };
        let section = DirectiveDescriptor {
            directive: SECTION_DIRECTIVE.into(),
            kind: DirectiveKind::RazorBlock,
            usage: DirectiveUsage::Unrestricted,
            tokens: vec![DirectiveTokenDescriptor {
                kind: DirectiveTokenKind::Member,
                optional: false,
                name: Some("SectionName".into()),
            }],
            description: Some("Define a section to be rendered in the configured layout page.".into()),
        };
        vec![Arc::new(inherits), Arc::new(functions), Arc::new(section)]
    })
}

/// Returns true for the three tag helper directives.
pub fn is_tag_helper_directive(name: &str) -> bool {
    matches!(
        name,
        ADD_TAG_HELPER_DIRECTIVE | REMOVE_TAG_HELPER_DIRECTIVE | TAG_HELPER_PREFIX_DIRECTIVE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_directive_tokens() {
        let directive = DirectiveDescriptor::create_code_block_directive("custom", |builder| {
            builder
                .add_type_token()
                .named("Model")
                .add_optional_member_token()
                .usage(DirectiveUsage::FileScopedMultipleOccurring);
        })
        .unwrap();

        assert_eq!(directive.kind, DirectiveKind::CodeBlock);
        assert_eq!(directive.usage, DirectiveUsage::FileScopedMultipleOccurring);
        assert_eq!(
            directive.tokens,
            vec![
                DirectiveTokenDescriptor {
                    kind: DirectiveTokenKind::Type,
                    optional: false,
                    name: Some("Model".into()),
                },
                DirectiveTokenDescriptor {
                    kind: DirectiveTokenKind::Member,
                    optional: true,
                    name: None,
                },
            ]
        );
    }

    #[test]
    fn test_invalid_declarations() {
        assert_eq!(
            DirectiveDescriptor::create_single_line_directive("", |_| {}),
            Err(DirectiveError::EmptyName)
        );
        assert_eq!(
            DirectiveDescriptor::create_single_line_directive("my-dir", |_| {}),
            Err(DirectiveError::InvalidName("my-dir".into()))
        );
        assert_eq!(
            DirectiveDescriptor::create_single_line_directive("d", |b| {
                b.add_optional_string_token().add_member_token();
            }),
            Err(DirectiveError::RequiredTokenAfterOptional("d".into()))
        );
    }

    #[test]
    fn test_builtins() {
        let names: Vec<_> = builtin_directives().iter().map(|d| d.directive.as_str()).collect();
        assert_eq!(names, vec!["inherits", "functions", "section"]);
    }
}
