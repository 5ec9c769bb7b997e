//! Tokenizers for the two sublanguages.
//!
//! The parser switches language at transitions, so lexing is exposed one
//! token at a time from an arbitrary location ([`lex_at`]). [`Tokenizer`]
//! is the whole-string iterator built on top of it.

mod csharp;
mod html;

pub use csharp::{is_terminated_literal, CSharpKeyword, CSharpTokenKind};
pub use html::HtmlTokenKind;

use logos::Logos;
use smol_str::SmolStr;
use source_map::SourceLocation;
use std::fmt;

/// Which tokenizer a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Html,
    CSharp,
}

/// Terminal categories of both sublanguages plus the Razor comment tokens
/// shared by both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Html(HtmlTokenKind),
    CSharp(CSharpTokenKind),
    /// The `@` of `@*` or `*@`.
    RazorCommentTransition,
    /// The `*` of `@*` or `*@`.
    RazorCommentStar,
    /// Comment text between the stars.
    RazorComment,
}

impl TokenKind {
    pub fn is_whitespace(&self) -> bool {
        match self {
            TokenKind::Html(kind) => kind.is_whitespace(),
            TokenKind::CSharp(kind) => kind.is_whitespace(),
            _ => false,
        }
    }

    pub fn is_newline(&self) -> bool {
        matches!(
            self,
            TokenKind::Html(HtmlTokenKind::NewLine) | TokenKind::CSharp(CSharpTokenKind::NewLine)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Html(kind) => write!(f, "Html.{}", kind.name()),
            TokenKind::CSharp(kind) => write!(f, "CSharp.{:?}", kind),
            TokenKind::RazorCommentTransition => f.write_str("RazorCommentTransition"),
            TokenKind::RazorCommentStar => f.write_str("RazorCommentStar"),
            TokenKind::RazorComment => f.write_str("RazorComment"),
        }
    }
}

/// A token: kind, exact text and where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken {
    pub kind: TokenKind,
    pub content: SmolStr,
    pub start: SourceLocation,
}

impl SyntaxToken {
    pub fn new(kind: TokenKind, content: impl Into<SmolStr>, start: SourceLocation) -> Self {
        Self {
            kind,
            content: content.into(),
            start,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Location just past this token.
    pub fn end(&self) -> SourceLocation {
        self.start.advance(&self.content)
    }

    pub fn is_html(&self, kind: HtmlTokenKind) -> bool {
        self.kind == TokenKind::Html(kind)
    }

    pub fn is_csharp(&self, kind: CSharpTokenKind) -> bool {
        self.kind == TokenKind::CSharp(kind)
    }

    /// The keyword this token spells, if it is a C# keyword token.
    pub fn keyword(&self) -> Option<CSharpKeyword> {
        match self.kind {
            TokenKind::CSharp(CSharpTokenKind::Keyword) => CSharpKeyword::lookup(&self.content),
            _ => None,
        }
    }
}

/// Lexes the single token that starts at `location`.
///
/// Returns `None` at end of input. Unrecognized input becomes a one
/// character `Text` (markup) or `Unknown` (code) token.
pub fn lex_at(source: &str, language: Language, location: SourceLocation) -> Option<SyntaxToken> {
    let rest = source.get(location.absolute_index..)?;
    if rest.is_empty() {
        return None;
    }
    let (kind, len) = match language {
        Language::Html => {
            let mut lexer = HtmlTokenKind::lexer(rest);
            match lexer.next() {
                Some(Ok(kind)) => (TokenKind::Html(kind), lexer.span().end),
                _ => (TokenKind::Html(HtmlTokenKind::Text), first_char_len(rest)),
            }
        }
        Language::CSharp => {
            let mut lexer = CSharpTokenKind::lexer(rest);
            match lexer.next() {
                Some(Ok(CSharpTokenKind::Identifier)) => {
                    let kind = if CSharpKeyword::lookup(lexer.slice()).is_some() {
                        CSharpTokenKind::Keyword
                    } else {
                        CSharpTokenKind::Identifier
                    };
                    (TokenKind::CSharp(kind), lexer.span().end)
                }
                Some(Ok(kind)) => (TokenKind::CSharp(kind), lexer.span().end),
                _ => (TokenKind::CSharp(CSharpTokenKind::Unknown), first_char_len(rest)),
            }
        }
    };
    Some(SyntaxToken::new(kind, &rest[..len], location))
}

fn first_char_len(text: &str) -> usize {
    text.chars().next().map_or(1, char::len_utf8)
}

/// Iterates over every token of a string in one language.
pub struct Tokenizer<'src> {
    source: &'src str,
    language: Language,
    offset: usize,
    location: SourceLocation,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str, language: Language) -> Self {
        Self::starting_at(source, language, SourceLocation::ZERO)
    }

    /// Tokenizes `source` as if it began at `start` in some larger document.
    /// Token locations are offset accordingly.
    pub fn starting_at(source: &'src str, language: Language, start: SourceLocation) -> Self {
        Self {
            source,
            language,
            offset: 0,
            location: start,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = SyntaxToken;

    fn next(&mut self) -> Option<SyntaxToken> {
        let local = SourceLocation::new(self.offset, 0, 0);
        let mut token = lex_at(self.source, self.language, local)?;
        token.start = self.location;
        self.offset += token.len();
        self.location = token.end();
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keywords_are_classified() {
        let kinds: Vec<_> = Tokenizer::new("if (x) foreach", Language::CSharp)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::CSharp(CSharpTokenKind::Keyword),
                TokenKind::CSharp(CSharpTokenKind::WhiteSpace),
                TokenKind::CSharp(CSharpTokenKind::LeftParenthesis),
                TokenKind::CSharp(CSharpTokenKind::Identifier),
                TokenKind::CSharp(CSharpTokenKind::RightParenthesis),
                TokenKind::CSharp(CSharpTokenKind::WhiteSpace),
                TokenKind::CSharp(CSharpTokenKind::Keyword),
            ]
        );
    }

    #[test]
    fn test_locations_track_lines() {
        let tokens: Vec<_> = Tokenizer::new("<p>\r\n  x", Language::Html).collect();
        let x = tokens.last().unwrap();
        assert_eq!(x.content, "x");
        assert_eq!(x.start, SourceLocation::new(7, 1, 2));
    }

    #[test]
    fn test_starting_at_offsets_locations() {
        let start = SourceLocation::new(10, 2, 4);
        let tokens: Vec<_> = Tokenizer::starting_at("a b", Language::Html, start).collect();
        assert_eq!(tokens[2].start, SourceLocation::new(12, 2, 6));
    }

    #[test]
    fn test_lex_at_unknown_character() {
        let token = lex_at("$", Language::CSharp, SourceLocation::ZERO).unwrap();
        assert_eq!(token.kind, TokenKind::CSharp(CSharpTokenKind::Unknown));
        assert_eq!(token.content, "$");
        assert!(lex_at("abc", Language::Html, SourceLocation::new(3, 0, 3)).is_none());
    }
}
