//! Directives: descriptor-driven directives, tag helper directives and
//! `@using`.

use super::Parser;
use crate::directives::{
    DirectiveDescriptor, DirectiveKind, DirectiveTokenKind, DirectiveUsage, ADD_TAG_HELPER_DIRECTIVE,
    REMOVE_TAG_HELPER_DIRECTIVE,
};
use crate::syntax::{
    AcceptedCharacters, BlockChunkGenerator, BlockKind, SpanChunkGenerator, SpanKind, TagHelperDirective,
};
use crate::tokenizer::{CSharpKeyword, CSharpTokenKind, HtmlTokenKind, Language, SyntaxToken, TokenKind};
use log::trace;
use razor_diagnostics::DiagnosticCode;
use smol_str::SmolStr;
use std::sync::Arc;

impl Parser<'_> {
    /// A directive with a registered descriptor, starting at its `@`.
    pub(super) fn parse_directive(&mut self, descriptor: Arc<DirectiveDescriptor>, leading: Vec<SyntaxToken>) {
        let name = descriptor.directive.clone();
        trace!("directive @{name}");
        let at = self.position;
        self.begin_code_block(
            BlockKind::Directive,
            BlockChunkGenerator::Directive(Arc::clone(&descriptor)),
            leading,
            SpanChunkGenerator::None,
        );
        self.advance();
        self.output_meta_code();

        let first = self.seen_directives.insert(name.clone());
        if descriptor.usage == DirectiveUsage::FileScopedSinglyOccurring && !first {
            self.block_error(DiagnosticCode::DuplicateDirective, at, name.len() + 1, &[name.as_str()]);
        }
        if descriptor.kind == DirectiveKind::SingleLine && !self.at_line_start(at.absolute_index) {
            self.block_error(
                DiagnosticCode::DirectiveMustAppearAtStartOfLine,
                at,
                name.len() + 1,
                &[name.as_str()],
            );
        }

        if !self.parse_directive_tokens(&descriptor) {
            self.end_block();
            return;
        }

        match descriptor.kind {
            DirectiveKind::SingleLine => self.parse_single_line_directive_end(&name),
            DirectiveKind::CodeBlock | DirectiveKind::RazorBlock => self.parse_directive_body(&descriptor),
        }
        self.end_block();
    }

    /// Matches the declared tokens in order. Returns false after reporting
    /// a missing or malformed required token.
    fn parse_directive_tokens(&mut self, descriptor: &DirectiveDescriptor) -> bool {
        for token in &descriptor.tokens {
            if token.optional {
                let next = self
                    .ahead()
                    .find(|token| !(token.kind.is_whitespace() && !token.kind.is_newline()));
                let absent = next.map_or(true, |next| {
                    next.kind.is_newline()
                        || next.is_csharp(CSharpTokenKind::LeftBrace)
                        || next.is_csharp(CSharpTokenKind::Semicolon)
                });
                if absent {
                    break;
                }
            }

            if self.at_whitespace() {
                self.accept_whitespace();
                self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::WhiteSpace);
            }

            let accepted = match token.kind {
                DirectiveTokenKind::Type => self.accept_type_name(),
                DirectiveTokenKind::Namespace => self.accept_qualified_name(),
                DirectiveTokenKind::Member => {
                    let ok = self.at_identifier();
                    if ok {
                        self.advance();
                    }
                    ok
                }
                DirectiveTokenKind::String => {
                    let ok = self.current.as_ref().is_some_and(|current| {
                        current.is_csharp(CSharpTokenKind::StringLiteral)
                            && current.content.starts_with('"')
                            && current.content.len() > 1
                            && current.content.ends_with('"')
                    });
                    if ok {
                        self.advance();
                    }
                    ok
                }
            };

            if !accepted {
                let code = match token.kind {
                    DirectiveTokenKind::Type => DiagnosticCode::DirectiveExpectsTypeName,
                    DirectiveTokenKind::Namespace => DiagnosticCode::DirectiveExpectsNamespace,
                    DirectiveTokenKind::Member => DiagnosticCode::DirectiveExpectsIdentifier,
                    DirectiveTokenKind::String => DiagnosticCode::DirectiveExpectsQuotedStringLiteral,
                };
                let start = self.position;
                let length = self.current_length();
                self.block_error(code, start, length, &[descriptor.directive.as_str()]);
                return false;
            }
            self.output(
                SpanKind::Code,
                SpanChunkGenerator::DirectiveToken(token.clone()),
                AcceptedCharacters::NonWhiteSpace,
            );
        }
        true
    }

    /// A dotted name, possibly generic, array or nullable.
    fn accept_type_name(&mut self) -> bool {
        if !self.accept_qualified_name() {
            return false;
        }
        while self.at_cs(CSharpTokenKind::LeftBracket) {
            self.advance();
            self.accept_while(|token| token.is_csharp(CSharpTokenKind::Comma));
            if self.at_cs(CSharpTokenKind::RightBracket) {
                self.advance();
            } else {
                break;
            }
        }
        if self.at_cs(CSharpTokenKind::QuestionMark) {
            self.advance();
        }
        true
    }

    /// `A.B::C<D, E>`
    fn accept_qualified_name(&mut self) -> bool {
        if !self.at_identifier() {
            return false;
        }
        loop {
            self.advance();
            if self.at_cs(CSharpTokenKind::LessThan) {
                self.accept_type_arguments();
            }
            let continues = (self.at_cs(CSharpTokenKind::Dot) || self.at_cs(CSharpTokenKind::DoubleColon))
                && self.peek().is_some_and(|token| {
                    matches!(
                        token.kind,
                        TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
                    )
                });
            if !continues {
                return true;
            }
            self.advance();
        }
    }

    fn accept_type_arguments(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.current.as_ref() {
            if token.kind.is_newline() {
                break;
            }
            let closes = token.is_csharp(CSharpTokenKind::GreaterThan);
            if token.is_csharp(CSharpTokenKind::LessThan) {
                depth += 1;
            } else if closes {
                depth = depth.saturating_sub(1);
            }
            self.advance();
            if closes && depth == 0 {
                break;
            }
        }
    }

    /// Optional `;` and the rest of the line after a single line directive.
    fn parse_single_line_directive_end(&mut self, name: &str) {
        self.accept_whitespace();
        if self.at_cs(CSharpTokenKind::Semicolon) {
            self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::WhiteSpace);
            self.advance();
            self.output_meta_code();
            self.accept_whitespace();
        }
        if self.at_newline() {
            self.advance();
        } else if !self.at_end() {
            self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::WhiteSpace);
            let start = self.position;
            let length = self.current_length();
            self.block_error(DiagnosticCode::UnexpectedDirectiveLiteral, start, length, &[name, "line break"]);
            return;
        }
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::WhiteSpace);
    }

    /// The `{ ... }` of a code block or razor block directive.
    fn parse_directive_body(&mut self, descriptor: &DirectiveDescriptor) {
        let name = descriptor.directive.as_str();
        self.accept_all_whitespace();
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::AllWhiteSpace);

        if self.at_end() {
            let start = self.position;
            self.block_error(DiagnosticCode::UnexpectedEofAfterDirective, start, 1, &[name, "{"]);
            return;
        }
        if !self.at_cs(CSharpTokenKind::LeftBrace) {
            let start = self.position;
            let length = self.current_length();
            self.block_error(DiagnosticCode::UnexpectedDirectiveLiteral, start, length, &[name, "{"]);
            return;
        }

        let open = self.position;
        self.advance();
        self.output_meta_code();

        if descriptor.kind == DirectiveKind::CodeBlock {
            self.accept_raw_code_block();
            self.output_span(SpanKind::Code, SpanChunkGenerator::Statement, AcceptedCharacters::Any);
        } else {
            self.set_language(Language::Html);
            self.start_block(BlockKind::Markup, BlockChunkGenerator::None);
            self.parse_markup_until_close_brace();
            self.end_block();
        }

        let closed = self.at_html(HtmlTokenKind::RightBrace) || self.at_cs(CSharpTokenKind::RightBrace);
        self.set_language(Language::CSharp);
        if closed {
            self.advance();
            self.output_meta_code();
            self.capture_trailing_markup();
        } else {
            self.block_error(DiagnosticCode::ExpectedEndOfBlockBeforeEof, open, 1, &[name, "}", "{"]);
        }
    }

    /// Code up to the brace closing a code block directive. No markup or
    /// templates are recognized inside.
    fn accept_raw_code_block(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::CSharp(CSharpTokenKind::RightBrace) if depth == 0 => break,
                TokenKind::CSharp(CSharpTokenKind::RightBrace) => depth -= 1,
                TokenKind::CSharp(CSharpTokenKind::LeftBrace) => depth += 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// `@addTagHelper`, `@removeTagHelper` and `@tagHelperPrefix`. The value
    /// runs to the end of the line and is checked later, when tag helpers are
    /// resolved.
    pub(super) fn parse_tag_helper_directive(&mut self, name: &str, leading: Vec<SyntaxToken>) {
        trace!("tag helper directive @{name}");
        self.begin_code_block(BlockKind::Directive, BlockChunkGenerator::None, leading, SpanChunkGenerator::None);
        let name_start = self.position;
        self.advance();
        self.output_meta_code();

        self.set_language(Language::Html);
        self.accept_whitespace();
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::WhiteSpace);

        let value_start = self.position;
        self.accept_while(|token| !token.kind.is_newline());
        let text = self.pending_text(0);
        let offset = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        let trimmed_start = value_start.advance(&text[..offset]);

        let mut diagnostics = Vec::new();
        let opens = trimmed.starts_with('"');
        let closes = trimmed.len() > 1 && trimmed.ends_with('"');
        let lookup_text = if opens && closes {
            &trimmed[1..trimmed.len() - 1]
        } else if opens || trimmed.ends_with('"') {
            let quote = if opens {
                trimmed_start
            } else {
                trimmed_start.advance(&trimmed[..trimmed.len() - 1])
            };
            diagnostics.push(self.diagnostic(DiagnosticCode::UnterminatedStringLiteral, quote, 1, &[]));
            diagnostics.push(self.diagnostic(
                DiagnosticCode::IncompleteQuotesAroundDirective,
                trimmed_start,
                trimmed.len(),
                &[name],
            ));
            trimmed.trim_matches('"')
        } else {
            trimmed
        };
        if trimmed.is_empty() {
            diagnostics.push(self.diagnostic(DiagnosticCode::DirectiveMustHaveValue, name_start, name.len(), &[name]));
        }

        let directive = TagHelperDirective {
            directive_text: SmolStr::new(&text),
            lookup_text: SmolStr::new(lookup_text.trim()),
            diagnostics,
        };
        let generator = match name {
            ADD_TAG_HELPER_DIRECTIVE => SpanChunkGenerator::AddTagHelper(directive),
            REMOVE_TAG_HELPER_DIRECTIVE => SpanChunkGenerator::RemoveTagHelper(directive),
            _ => SpanChunkGenerator::TagHelperPrefix(directive),
        };
        self.output_span(SpanKind::Code, generator, AcceptedCharacters::AnyExceptNewline);
        self.set_language(Language::CSharp);
        self.end_block();
    }

    /// `@using Namespace`, `@using static Type` and `@using Alias = Type`.
    pub(super) fn parse_using_directive(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(BlockKind::Directive, BlockChunkGenerator::None, leading, SpanChunkGenerator::None);
        self.advance();
        self.accept_whitespace();

        let is_static = self.current_keyword() == Some(CSharpKeyword::Static)
            && self.peek_past_whitespace().is_some_and(|token| {
                matches!(
                    token.kind,
                    TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
                )
            });
        if is_static {
            self.advance();
            self.accept_whitespace();
        }

        let name_from = self.pending.len();
        if self.accept_qualified_name() {
            let alias = self
                .ahead()
                .find(|token| !(token.kind.is_whitespace() && !token.kind.is_newline()))
                .is_some_and(|token| token.is_csharp(CSharpTokenKind::Assign));
            if alias {
                self.accept_whitespace();
                self.advance();
                self.accept_whitespace();
                self.accept_type_name();
            }
        }
        let namespace = SmolStr::new(self.pending_text(name_from).trim());
        if self.at_cs(CSharpTokenKind::Semicolon) {
            self.advance();
        }
        self.output_span(
            SpanKind::Code,
            SpanChunkGenerator::AddImport { namespace, is_static },
            AcceptedCharacters::AnyExceptNewline,
        );
        self.end_block();
    }

    /// Directives, whitespace and comments at the top of the document. The
    /// first other content ends the scan and everything from there on is a
    /// single markup span.
    pub(super) fn parse_leading_directives(&mut self) {
        self.set_language(Language::Html);
        loop {
            self.accept_all_whitespace();
            if !self.at_html(HtmlTokenKind::Transition) {
                break;
            }
            if self.char_at(self.position.absolute_index + 1) == Some('*') {
                self.output_markup();
                self.parse_razor_comment();
                continue;
            }
            if !self.at_leading_directive() {
                break;
            }
            self.parse_code_from_markup(true);
        }
        while !self.at_end() {
            self.advance();
        }
        self.output_markup();
    }

    fn at_leading_directive(&self) -> bool {
        let Some(word) = self.token_after_transition() else {
            return false;
        };
        if !matches!(
            word.kind,
            TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
        ) {
            return false;
        }
        if self.directives.contains_key(word.content.as_str())
            || crate::directives::is_tag_helper_directive(&word.content)
        {
            return true;
        }
        word.keyword() == Some(CSharpKeyword::Using)
            && !Self::tokens_from(self.text, Language::CSharp, word.end())
                .find(|token| !token.kind.is_whitespace())
                .is_some_and(|token| token.is_csharp(CSharpTokenKind::LeftParenthesis))
    }
}
