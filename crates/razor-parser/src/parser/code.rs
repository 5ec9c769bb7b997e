//! Code mode: expressions, statement blocks and the markup embedded in them.

use super::Parser;
use crate::syntax::{AcceptedCharacters, BlockChunkGenerator, BlockKind, SpanChunkGenerator, SpanKind};
use crate::tokenizer::{CSharpKeyword, CSharpTokenKind, HtmlTokenKind, Language, SyntaxToken, TokenKind};
use razor_diagnostics::DiagnosticCode;

/// Keywords that start a statement with a body.
fn is_block_keyword(keyword: CSharpKeyword) -> bool {
    matches!(
        keyword,
        CSharpKeyword::If
            | CSharpKeyword::For
            | CSharpKeyword::Foreach
            | CSharpKeyword::While
            | CSharpKeyword::Switch
            | CSharpKeyword::Lock
            | CSharpKeyword::Do
            | CSharpKeyword::Try
            | CSharpKeyword::Using
    )
}

fn is_identifier(token: &SyntaxToken) -> bool {
    matches!(
        token.kind,
        TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
    )
}

fn is_trivia(token: &SyntaxToken) -> bool {
    token.kind.is_whitespace() || token.is_csharp(CSharpTokenKind::Comment)
}

impl Parser<'_> {
    /// At an `@` in markup that starts code.
    pub(super) fn parse_code_from_markup(&mut self, allow_directives: bool) {
        let leading = if self.options.design_time {
            Vec::new()
        } else {
            self.take_line_leading_whitespace()
        };
        self.output_markup();
        self.set_language(Language::CSharp);

        let next = self.token_after_transition();
        match next.as_ref().map(|token| token.kind) {
            Some(TokenKind::CSharp(CSharpTokenKind::LeftBrace)) => self.parse_statement_block(leading),
            Some(TokenKind::CSharp(CSharpTokenKind::LeftParenthesis)) => self.parse_explicit_expression(leading),
            Some(TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)) => {
                let word = next.map(|token| token.content).unwrap_or_default();
                self.parse_identifier_after_transition(&word, leading, allow_directives);
            }
            Some(TokenKind::CSharp(CSharpTokenKind::WhiteSpace | CSharpTokenKind::NewLine)) => {
                let location = self.position.advance("@");
                let length = next.as_ref().map_or(1, SyntaxToken::len);
                self.error(DiagnosticCode::UnexpectedWhiteSpaceAtStartOfCodeBlock, location, length, &[]);
                self.parse_empty_expression(leading);
            }
            None => {
                let location = self.position.advance("@");
                self.error(DiagnosticCode::UnexpectedEndOfFileAtStartOfCodeBlock, location, 1, &[]);
                self.parse_empty_expression(leading);
            }
            Some(_) => {
                let location = self.position.advance("@");
                let found = next.as_ref().map_or("", |token| token.content.as_str());
                let length = next.as_ref().map_or(1, SyntaxToken::len);
                self.error(
                    DiagnosticCode::UnexpectedCharacterAtStartOfCodeBlock,
                    location,
                    length,
                    &[found],
                );
                self.parse_empty_expression(leading);
            }
        }
        self.set_language(Language::Html);
    }

    fn parse_identifier_after_transition(&mut self, word: &str, leading: Vec<SyntaxToken>, allow_directives: bool) {
        if allow_directives {
            if let Some(descriptor) = self.directives.get(word).cloned() {
                self.parse_directive(descriptor, leading);
                return;
            }
            if crate::directives::is_tag_helper_directive(word) {
                self.parse_tag_helper_directive(word, leading);
                return;
            }
        }
        match CSharpKeyword::lookup(word) {
            Some(CSharpKeyword::Using) => {
                let after = self.position.advance("@").advance(word);
                let is_statement = Self::tokens_from(self.text, Language::CSharp, after)
                    .find(|token| !token.kind.is_whitespace())
                    .is_some_and(|token| token.is_csharp(CSharpTokenKind::LeftParenthesis));
                if is_statement {
                    self.parse_keyword_block(leading);
                } else {
                    self.parse_using_directive(leading);
                }
            }
            Some(keyword) if is_block_keyword(keyword) => self.parse_keyword_block(leading),
            Some(CSharpKeyword::Class | CSharpKeyword::Namespace) => self.parse_reserved_word(word, leading),
            _ => self.parse_implicit_expression(leading),
        }
    }

    /// Opens a code block and outputs the line's leading whitespace and the
    /// `@` transition.
    pub(super) fn begin_code_block(
        &mut self,
        kind: BlockKind,
        generator: BlockChunkGenerator,
        leading: Vec<SyntaxToken>,
        leading_generator: SpanChunkGenerator,
    ) {
        self.start_block(kind, generator);
        self.output_tokens(leading, SpanKind::Code, leading_generator, AcceptedCharacters::Any);
        self.accept_transition();
        self.output_transition();
    }

    /// Trailing whitespace and line break after a code construct, as markup
    /// owned by the construct.
    pub(super) fn capture_trailing_markup(&mut self) {
        if !self.can_capture_trailing_whitespace() {
            return;
        }
        self.set_language(Language::Html);
        self.capture_whitespace_to_end_of_line();
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::None);
        self.set_language(Language::CSharp);
    }

    fn parse_empty_expression(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Expression,
            BlockChunkGenerator::Expression,
            leading,
            SpanChunkGenerator::Expression,
        );
        self.output_span(SpanKind::Code, SpanChunkGenerator::Expression, AcceptedCharacters::NonWhiteSpace);
        self.end_block();
    }

    /// `@{ ... }`
    fn parse_statement_block(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Statement,
            BlockChunkGenerator::Statement,
            leading,
            SpanChunkGenerator::Statement,
        );
        let open = self.position;
        self.advance();
        self.output_meta_code();

        self.parse_code_body();
        self.output_span(SpanKind::Code, SpanChunkGenerator::Statement, AcceptedCharacters::Any);

        if self.at_cs(CSharpTokenKind::RightBrace) {
            self.advance();
            self.output_meta_code();
            self.capture_trailing_markup();
        } else {
            self.block_error(DiagnosticCode::ExpectedEndOfBlockBeforeEof, open, 1, &["code", "}", "{"]);
        }
        self.end_block();
    }

    /// `@( ... )`
    fn parse_explicit_expression(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Expression,
            BlockChunkGenerator::Expression,
            leading,
            SpanChunkGenerator::Expression,
        );
        self.parse_explicit_expression_body();
        self.end_block();
    }

    /// From the `(` of an explicit expression to its `)`.
    fn parse_explicit_expression_body(&mut self) {
        let open = self.position;
        self.advance();
        self.output_meta_code();
        let closed = self.accept_until_close(
            CSharpTokenKind::LeftParenthesis,
            CSharpTokenKind::RightParenthesis,
            SpanChunkGenerator::Expression,
        );
        self.output_span(SpanKind::Code, SpanChunkGenerator::Expression, AcceptedCharacters::Any);
        if closed {
            self.advance();
            self.output_meta_code();
        } else {
            self.block_error(
                DiagnosticCode::ExpectedEndOfBlockBeforeEof,
                open,
                1,
                &["explicit expression", ")", "("],
            );
        }
    }

    /// `@name.Member(args)[index]`
    fn parse_implicit_expression(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Expression,
            BlockChunkGenerator::Expression,
            leading,
            SpanChunkGenerator::Expression,
        );
        self.parse_implicit_expression_body();
        self.output_span(SpanKind::Code, SpanChunkGenerator::Expression, AcceptedCharacters::NonWhiteSpace);
        self.end_block();
    }

    fn parse_implicit_expression_body(&mut self) {
        if self.current_keyword() == Some(CSharpKeyword::Await)
            && self.peek_past_whitespace().as_ref().is_some_and(is_identifier)
        {
            self.advance();
            self.accept_whitespace();
        }
        if !self.at_identifier() {
            return;
        }
        self.advance();
        loop {
            let mut ahead = self.ahead();
            let first = ahead.next();
            let second = ahead.next();
            let third = ahead.next();
            let (Some(first), second) = (first, second) else {
                break;
            };
            match first.kind {
                TokenKind::CSharp(CSharpTokenKind::Dot) if second.as_ref().is_some_and(is_identifier) => {
                    self.advance();
                    self.advance();
                }
                TokenKind::CSharp(CSharpTokenKind::QuestionMark) => {
                    let second_kind = second.as_ref().map(|token| token.kind);
                    if second_kind == Some(TokenKind::CSharp(CSharpTokenKind::Dot))
                        && third.as_ref().is_some_and(is_identifier)
                    {
                        self.advance();
                        self.advance();
                        self.advance();
                    } else if second_kind == Some(TokenKind::CSharp(CSharpTokenKind::LeftBracket))
                        && self.has_closer_after(second.map_or(self.position, |token| token.start))
                    {
                        self.advance();
                        self.accept_balanced(SpanChunkGenerator::Expression);
                    } else {
                        break;
                    }
                }
                TokenKind::CSharp(CSharpTokenKind::LeftParenthesis | CSharpTokenKind::LeftBracket)
                    if self.has_closer_after(first.start) =>
                {
                    self.accept_balanced(SpanChunkGenerator::Expression);
                }
                _ => break,
            }
        }
    }

    /// True if the bracket at `start` has a matching closer before end of
    /// file.
    fn has_closer_after(&self, start: source_map::SourceLocation) -> bool {
        let mut tokens = Self::tokens_from(self.text, Language::CSharp, start);
        let Some(open) = tokens.next() else {
            return false;
        };
        let TokenKind::CSharp(open_kind) = open.kind else {
            return false;
        };
        let close_kind = match open_kind {
            CSharpTokenKind::LeftParenthesis => CSharpTokenKind::RightParenthesis,
            CSharpTokenKind::LeftBracket => CSharpTokenKind::RightBracket,
            CSharpTokenKind::LeftBrace => CSharpTokenKind::RightBrace,
            _ => return false,
        };
        let mut depth = 1usize;
        for token in tokens {
            if token.is_csharp(open_kind) {
                depth += 1;
            } else if token.is_csharp(close_kind) {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }

    /// Accepts a bracketed region including both brackets.
    fn accept_balanced(&mut self, generator: SpanChunkGenerator) {
        let Some(TokenKind::CSharp(open)) = self.current_kind() else {
            return;
        };
        let close = match open {
            CSharpTokenKind::LeftParenthesis => CSharpTokenKind::RightParenthesis,
            CSharpTokenKind::LeftBracket => CSharpTokenKind::RightBracket,
            CSharpTokenKind::LeftBrace => CSharpTokenKind::RightBrace,
            _ => {
                self.advance();
                return;
            }
        };
        self.advance();
        if self.accept_until_close(open, close, generator) {
            self.advance();
        }
    }

    /// Accepts code up to the `close` token that balances an already
    /// accepted `open`, leaving the closer current. Inline templates are
    /// parsed as they are found. Returns false at end of file.
    fn accept_until_close(
        &mut self,
        open: CSharpTokenKind,
        close: CSharpTokenKind,
        generator: SpanChunkGenerator,
    ) -> bool {
        let mut depth = 0usize;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::CSharp(kind) if kind == close && depth == 0 => return true,
                TokenKind::CSharp(kind) if kind == close => depth -= 1,
                TokenKind::CSharp(kind) if kind == open => depth += 1,
                TokenKind::CSharp(CSharpTokenKind::Transition)
                    if self.char_at(self.position.absolute_index + 1) == Some('<') =>
                {
                    self.output(SpanKind::Code, generator.clone(), AcceptedCharacters::Any);
                    self.parse_template();
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
        false
    }

    /// Statements up to an unbalanced `}`, which is left current.
    fn parse_code_body(&mut self) {
        let mut statement_start = true;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::CSharp(CSharpTokenKind::RightBrace) => break,
                TokenKind::CSharp(CSharpTokenKind::LeftBrace) => {
                    self.advance();
                    self.parse_code_body();
                    if self.at_cs(CSharpTokenKind::RightBrace) {
                        self.advance();
                    }
                    statement_start = true;
                }
                TokenKind::CSharp(CSharpTokenKind::WhiteSpace | CSharpTokenKind::NewLine | CSharpTokenKind::Comment) => {
                    self.advance();
                }
                TokenKind::CSharp(CSharpTokenKind::Semicolon | CSharpTokenKind::Colon) => {
                    self.advance();
                    statement_start = true;
                }
                TokenKind::CSharp(CSharpTokenKind::Transition) => {
                    statement_start = self.parse_code_transition(statement_start);
                }
                TokenKind::CSharp(CSharpTokenKind::LessThan) if statement_start && self.markup_follows() => {
                    self.parse_markup_in_code();
                    statement_start = true;
                }
                TokenKind::CSharp(CSharpTokenKind::Keyword) if statement_start && self.at_block_statement() => {
                    self.parse_keyword_statement(false);
                    statement_start = true;
                }
                _ => {
                    self.advance();
                    statement_start = false;
                }
            }
        }
    }

    /// True at a keyword that starts a statement with a body. `using` only
    /// counts when followed by `(`.
    fn at_block_statement(&self) -> bool {
        match self.current_keyword() {
            Some(CSharpKeyword::Using) => self
                .ahead()
                .skip(1)
                .find(|token| !token.kind.is_whitespace())
                .is_some_and(|token| token.is_csharp(CSharpTokenKind::LeftParenthesis)),
            Some(keyword) => is_block_keyword(keyword),
            None => false,
        }
    }

    /// True if the current `<` opens a tag.
    fn markup_follows(&self) -> bool {
        self.peek().is_some_and(|token| {
            is_identifier(&token)
                || token.is_csharp(CSharpTokenKind::Slash)
                || token.is_csharp(CSharpTokenKind::Not)
        })
    }

    /// At an `@` inside code. Returns whether the next token starts a
    /// statement.
    fn parse_code_transition(&mut self, statement_start: bool) -> bool {
        let at = self.position;
        match self.char_at(at.absolute_index + 1) {
            Some('<') => {
                self.flush();
                self.parse_template();
                false
            }
            Some(':') => {
                self.flush();
                self.parse_markup_line_block();
                true
            }
            Some('*') => {
                self.flush();
                self.parse_razor_comment();
                statement_start
            }
            Some('{') => {
                self.error(DiagnosticCode::UnexpectedNestedCodeBlock, at, 1, &[]);
                self.accept_transition();
                self.advance();
                self.parse_code_body();
                if self.at_cs(CSharpTokenKind::RightBrace) {
                    self.advance();
                }
                true
            }
            Some('(') => {
                self.flush();
                self.start_block(BlockKind::Expression, BlockChunkGenerator::Expression);
                self.accept_transition();
                self.output_transition();
                self.parse_explicit_expression_body();
                self.end_block();
                false
            }
            _ if self.token_after_transition().as_ref().is_some_and(is_identifier) => {
                self.flush();
                self.accept_transition();
                self.output_transition();
                statement_start
            }
            _ => {
                self.error(DiagnosticCode::AtInCodeMustBeFollowedByColonParenOrIdentifierStart, at, 1, &[]);
                self.accept_transition();
                false
            }
        }
    }

    /// `@<tag>...</tag>` inside code.
    fn parse_template(&mut self) {
        let at = self.position;
        if self.in_template {
            self.error(DiagnosticCode::NestedTemplate, at, 1, &[]);
        }
        let was_in_template = std::mem::replace(&mut self.in_template, true);
        self.start_block(BlockKind::Template, BlockChunkGenerator::Template);
        self.start_block(BlockKind::Markup, BlockChunkGenerator::None);
        self.accept_transition();
        self.output_transition();

        self.set_language(Language::Html);
        let names_tag = self
            .peek()
            .is_some_and(|token| token.is_html(HtmlTokenKind::Text) || token.is_html(HtmlTokenKind::ForwardSlash));
        if !names_tag {
            self.error(DiagnosticCode::OuterTagMissingName, self.position, 1, &[]);
        }
        self.markup_in_code += 1;
        self.parse_element();
        self.markup_in_code -= 1;
        self.end_block();
        self.end_block();
        self.set_language(Language::CSharp);
        self.in_template = was_in_template;
    }

    /// `@:` followed by markup to the end of the line.
    fn parse_markup_line_block(&mut self) {
        self.start_block(BlockKind::Markup, BlockChunkGenerator::None);
        self.accept_transition();
        self.output_transition();
        self.advance_raw(TokenKind::CSharp(CSharpTokenKind::Colon), 1);
        self.output(SpanKind::MetaCode, SpanChunkGenerator::None, AcceptedCharacters::Any);

        self.set_language(Language::Html);
        self.markup_in_code += 1;
        self.parse_markup_line();
        self.markup_in_code -= 1;
        self.end_block();
        self.set_language(Language::CSharp);
    }

    /// A tag at the start of a statement and everything up to its end tag.
    fn parse_markup_in_code(&mut self) {
        let leading = self.take_line_leading_whitespace();
        self.flush();
        self.start_block(BlockKind::Markup, BlockChunkGenerator::None);
        self.output_tokens(leading, SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::Any);

        self.set_language(Language::Html);
        self.markup_in_code += 1;
        self.parse_element();
        self.markup_in_code -= 1;
        if !self.options.design_time {
            self.capture_whitespace_to_end_of_line();
            self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::None);
        }
        self.end_block();
        self.set_language(Language::CSharp);
    }

    /// `@if (...) { ... }` and the other keyword statements written directly
    /// after a transition.
    fn parse_keyword_block(&mut self, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Statement,
            BlockChunkGenerator::Statement,
            leading,
            SpanChunkGenerator::Statement,
        );
        self.parse_keyword_statement(true);
        if self.can_capture_trailing_whitespace() {
            self.capture_whitespace_to_end_of_line();
        }
        self.output(SpanKind::Code, SpanChunkGenerator::Statement, AcceptedCharacters::Any);
        self.end_block();
    }

    /// `@class` and `@namespace` cannot start code.
    fn parse_reserved_word(&mut self, word: &str, leading: Vec<SyntaxToken>) {
        self.begin_code_block(
            BlockKind::Directive,
            BlockChunkGenerator::None,
            leading,
            SpanChunkGenerator::None,
        );
        let start = self.position;
        self.advance();
        self.output_meta_code();
        self.block_error(DiagnosticCode::ReservedWord, start, word.len(), &[word]);
        self.end_block();
    }

    fn accept_trivia(&mut self) {
        self.accept_while(is_trivia);
    }

    /// True if the next non-trivia token is `keyword`.
    fn keyword_follows(&self, keyword: CSharpKeyword) -> bool {
        self.ahead()
            .find(|token| !is_trivia(token))
            .is_some_and(|token| token.keyword() == Some(keyword))
    }

    /// Parses one keyword statement starting at its keyword.
    fn parse_keyword_statement(&mut self, top_level: bool) {
        let Some(keyword) = self.current_keyword() else {
            self.advance();
            return;
        };
        let name = keyword.as_str();
        self.advance();
        match keyword {
            CSharpKeyword::If => {
                self.parse_condition();
                self.parse_statement_body(name, top_level);
                while self.keyword_follows(CSharpKeyword::Else) {
                    self.accept_trivia();
                    self.advance();
                    if self.keyword_follows(CSharpKeyword::If) {
                        self.accept_trivia();
                        self.advance();
                        self.parse_condition();
                        self.parse_statement_body("else if", top_level);
                    } else {
                        self.parse_statement_body("else", top_level);
                        break;
                    }
                }
            }
            CSharpKeyword::Do => {
                self.parse_statement_body(name, top_level);
                if self.keyword_follows(CSharpKeyword::While) {
                    self.accept_trivia();
                    self.advance();
                    self.parse_condition();
                    self.accept_whitespace();
                    if self.at_cs(CSharpTokenKind::Semicolon) {
                        self.advance();
                    }
                }
            }
            CSharpKeyword::Try => {
                self.parse_statement_body(name, top_level);
                loop {
                    if self.keyword_follows(CSharpKeyword::Catch) {
                        self.accept_trivia();
                        self.advance();
                        if self.condition_follows() {
                            self.parse_condition();
                        }
                        if self.contextual_keyword_follows("when") {
                            self.accept_trivia();
                            self.advance();
                            self.parse_condition();
                        }
                        self.parse_statement_body("catch", top_level);
                    } else if self.keyword_follows(CSharpKeyword::Finally) {
                        self.accept_trivia();
                        self.advance();
                        self.parse_statement_body("finally", top_level);
                        break;
                    } else {
                        break;
                    }
                }
            }
            _ => {
                self.parse_condition();
                self.parse_statement_body(name, top_level);
            }
        }
    }

    fn contextual_keyword_follows(&self, word: &str) -> bool {
        self.ahead()
            .find(|token| !is_trivia(token))
            .is_some_and(|token| token.is_csharp(CSharpTokenKind::Identifier) && token.content == word)
    }

    fn condition_follows(&self) -> bool {
        self.ahead()
            .find(|token| !is_trivia(token))
            .is_some_and(|token| token.is_csharp(CSharpTokenKind::LeftParenthesis))
    }

    /// The parenthesized part of a keyword statement.
    fn parse_condition(&mut self) {
        if !self.condition_follows() {
            return;
        }
        self.accept_trivia();
        let open = self.position;
        self.advance();
        if self.accept_until_close(
            CSharpTokenKind::LeftParenthesis,
            CSharpTokenKind::RightParenthesis,
            SpanChunkGenerator::Statement,
        ) {
            self.advance();
        } else {
            self.error(DiagnosticCode::ExpectedCloseBracketBeforeEof, open, 1, &["(", ")"]);
        }
    }

    /// The `{ ... }` body of a keyword statement. Without braces a single
    /// statement is parsed; at the top level that is an error.
    fn parse_statement_body(&mut self, keyword: &str, top_level: bool) {
        let brace_follows = self
            .ahead()
            .find(|token| !is_trivia(token))
            .is_some_and(|token| token.is_csharp(CSharpTokenKind::LeftBrace));
        if brace_follows {
            self.accept_trivia();
            let open = self.position;
            self.advance();
            self.parse_code_body();
            if self.at_cs(CSharpTokenKind::RightBrace) {
                self.advance();
            } else {
                self.block_error(DiagnosticCode::ExpectedEndOfBlockBeforeEof, open, 1, &[keyword, "}", "{"]);
            }
            return;
        }

        if top_level {
            let found = self.ahead().find(|token| !is_trivia(token));
            let (location, length, text) = match &found {
                Some(token) => (token.start, token.len(), token.content.as_str()),
                None => (self.position, 1, "end of file"),
            };
            self.error(
                DiagnosticCode::SingleLineControlFlowStatementsNotAllowed,
                location,
                length,
                &["{", text],
            );
        }
        self.parse_single_statement(top_level);
    }

    /// A statement ending at `;`, or a nested keyword statement.
    fn parse_single_statement(&mut self, top_level: bool) {
        self.accept_trivia();
        if self.at_block_statement() {
            self.parse_keyword_statement(top_level);
            return;
        }
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::CSharp(CSharpTokenKind::Semicolon) => {
                    self.advance();
                    break;
                }
                TokenKind::CSharp(CSharpTokenKind::RightBrace) => break,
                TokenKind::CSharp(CSharpTokenKind::LeftBrace) => {
                    self.advance();
                    self.parse_code_body();
                    if self.at_cs(CSharpTokenKind::RightBrace) {
                        self.advance();
                    }
                    break;
                }
                TokenKind::CSharp(CSharpTokenKind::LessThan) if self.markup_follows() => {
                    self.parse_markup_in_code();
                    break;
                }
                TokenKind::CSharp(CSharpTokenKind::Transition) => {
                    self.parse_code_transition(false);
                }
                _ => self.advance(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_keywords() {
        assert!(is_block_keyword(CSharpKeyword::Foreach));
        assert!(is_block_keyword(CSharpKeyword::Using));
        assert!(!is_block_keyword(CSharpKeyword::Else));
        assert!(!is_block_keyword(CSharpKeyword::Await));
    }
}
