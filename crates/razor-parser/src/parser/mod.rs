//! The block parser.
//!
//! A hand-written recursive-descent parser over two token streams. Tokens
//! are lexed lazily one at a time at the current location, so switching
//! between markup and code is a matter of re-lexing the current token in
//! the other language.
//!
//! Tokens accumulate in a pending list until a construct decides what they
//! are and outputs them as a [`Span`]. Spans are appended to the innermost
//! open block; blocks are opened and closed around constructs.

mod code;
mod directive;
mod markup;

pub(crate) use markup::is_void_element;

use crate::directives::{builtin_directives, DirectiveDescriptor};
use crate::options::RazorParserOptions;
use crate::source::RazorSourceDocument;
use crate::syntax::{
    AcceptedCharacters, Block, BlockChunkGenerator, BlockKind, RazorSyntaxTree, Span, SpanChunkGenerator,
    SpanKind, SyntaxNode,
};
use crate::tokenizer::{
    is_terminated_literal, lex_at, CSharpKeyword, CSharpTokenKind, HtmlTokenKind, Language, SyntaxToken, TokenKind,
};
use log::debug;
use razor_diagnostics::{DiagnosticCode, RazorDiagnostic};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use source_map::SourceLocation;
use std::sync::Arc;

struct BlockFrame {
    kind: BlockKind,
    generator: BlockChunkGenerator,
    children: Vec<SyntaxNode>,
    start: SourceLocation,
    diagnostics: Vec<RazorDiagnostic>,
}

impl BlockFrame {
    fn new(kind: BlockKind, generator: BlockChunkGenerator, start: SourceLocation) -> Self {
        Self {
            kind,
            generator,
            children: Vec::new(),
            start,
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> Block {
        Block::new(self.kind, self.generator, self.children, self.start).with_diagnostics(self.diagnostics)
    }
}

pub(crate) struct Parser<'a> {
    source: &'a RazorSourceDocument,
    text: &'a str,
    options: Arc<RazorParserOptions>,
    directives: FxHashMap<SmolStr, Arc<DirectiveDescriptor>>,
    language: Language,
    /// Where the current token starts; also the end of everything accepted.
    position: SourceLocation,
    current: Option<SyntaxToken>,
    /// Accepted tokens not yet output as a span.
    pending: Vec<SyntaxToken>,
    blocks: Vec<BlockFrame>,
    diagnostics: Vec<RazorDiagnostic>,
    in_template: bool,
    /// How many markup regions inside code enclose the current position.
    markup_in_code: usize,
    seen_directives: FxHashSet<SmolStr>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a RazorSourceDocument, options: Arc<RazorParserOptions>) -> Self {
        let mut directives = FxHashMap::default();
        for directive in builtin_directives().iter().chain(options.directives.iter()) {
            directives.insert(directive.directive.clone(), Arc::clone(directive));
        }
        let text = source.text();
        let mut parser = Self {
            source,
            text,
            options,
            directives,
            language: Language::Html,
            position: SourceLocation::ZERO,
            current: None,
            pending: Vec::new(),
            blocks: vec![BlockFrame::new(
                BlockKind::Markup,
                BlockChunkGenerator::None,
                SourceLocation::ZERO,
            )],
            diagnostics: Vec::new(),
            in_template: false,
            markup_in_code: 0,
            seen_directives: FxHashSet::default(),
        };
        parser.relex();
        parser
    }

    pub(crate) fn parse(mut self) -> RazorSyntaxTree {
        debug!(
            "parsing {} ({} bytes)",
            self.source.file_path().map_or("<anonymous>", |p| p.as_ref()),
            self.text.len()
        );
        if self.options.parse_leading_directives {
            self.parse_leading_directives();
        } else {
            self.parse_markup_document();
        }

        debug_assert_eq!(self.blocks.len(), 1, "unbalanced block stack");
        while self.blocks.len() > 1 {
            self.end_block();
        }
        self.flush();
        let root = self
            .blocks
            .pop()
            .unwrap_or_else(|| BlockFrame::new(BlockKind::Markup, BlockChunkGenerator::None, SourceLocation::ZERO))
            .finish();
        debug_assert_eq!(root.length(), self.text.len());
        debug!("parsed document with {} diagnostic(s)", self.diagnostics.len());
        RazorSyntaxTree::new(Arc::new(root), self.diagnostics, self.options, self.source.clone())
    }

    // === Tokens ===

    fn relex(&mut self) {
        self.current = lex_at(self.text, self.language, self.position);
    }

    fn set_language(&mut self, language: Language) {
        if self.language != language {
            self.language = language;
            self.relex();
        }
    }

    fn at_end(&self) -> bool {
        self.current.is_none()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|token| token.kind == kind)
    }

    fn at_html(&self, kind: HtmlTokenKind) -> bool {
        self.at(TokenKind::Html(kind))
    }

    fn at_cs(&self, kind: CSharpTokenKind) -> bool {
        self.at(TokenKind::CSharp(kind))
    }

    fn at_whitespace(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|token| token.kind.is_whitespace() && !token.kind.is_newline())
    }

    fn at_newline(&self) -> bool {
        self.current.as_ref().is_some_and(|token| token.kind.is_newline())
    }

    fn at_identifier(&self) -> bool {
        self.current.as_ref().is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::CSharp(CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
            )
        })
    }

    fn current_text(&self) -> &str {
        self.current.as_ref().map_or("", |token| token.content.as_str())
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current.as_ref().map(|token| token.kind)
    }

    fn current_keyword(&self) -> Option<CSharpKeyword> {
        self.current.as_ref().and_then(SyntaxToken::keyword)
    }

    /// Text of the pending tokens from index `from` on.
    fn pending_text(&self, from: usize) -> String {
        self.pending
            .get(from..)
            .unwrap_or_default()
            .iter()
            .map(|token| token.content.as_str())
            .collect()
    }

    /// Accepts the `@` at the current position as a transition token, even
    /// where the code tokenizer would have read it as part of a verbatim
    /// string.
    fn accept_transition(&mut self) {
        let kind = match self.language {
            Language::Html => TokenKind::Html(HtmlTokenKind::Transition),
            Language::CSharp => TokenKind::CSharp(CSharpTokenKind::Transition),
        };
        self.advance_raw(kind, 1);
    }

    /// The code token after the `@` at the current position.
    fn token_after_transition(&self) -> Option<SyntaxToken> {
        lex_at(self.text, Language::CSharp, self.position.advance("@"))
    }

    /// Trailing whitespace after a code construct belongs to it only outside
    /// design time and when not nested in markup.
    fn can_capture_trailing_whitespace(&self) -> bool {
        !self.options.design_time && self.markup_in_code == 0
    }

    /// Accepts the current token into the pending span.
    fn advance(&mut self) {
        let Some(token) = self.current.take() else {
            return;
        };
        if let TokenKind::CSharp(kind) = token.kind {
            self.check_literal(kind, &token);
        }
        self.position = token.end();
        self.pending.push(token);
        self.relex();
    }

    /// Accepts `len` bytes as one token of `kind`, regardless of what the
    /// tokenizer would produce there.
    fn advance_raw(&mut self, kind: TokenKind, len: usize) {
        let start = self.position.absolute_index;
        let end = (start + len).min(self.text.len());
        let Some(content) = self.text.get(start..end).filter(|content| !content.is_empty()) else {
            return;
        };
        let token = SyntaxToken::new(kind, content, self.position);
        self.position = token.end();
        self.pending.push(token);
        self.relex();
    }

    fn accept_while(&mut self, predicate: impl Fn(&SyntaxToken) -> bool) {
        while self.current.as_ref().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Accepts spaces and tabs.
    fn accept_whitespace(&mut self) {
        while self.at_whitespace() {
            self.advance();
        }
    }

    /// Accepts spaces, tabs and line breaks.
    fn accept_all_whitespace(&mut self) {
        self.accept_while(|token| token.kind.is_whitespace());
    }

    fn check_literal(&mut self, kind: CSharpTokenKind, token: &SyntaxToken) {
        if is_terminated_literal(kind, &token.content) {
            return;
        }
        let code = match kind {
            CSharpTokenKind::StringLiteral | CSharpTokenKind::CharacterLiteral => {
                DiagnosticCode::UnterminatedStringLiteral
            }
            CSharpTokenKind::Comment => DiagnosticCode::UnterminatedBlockComment,
            _ => return,
        };
        self.error(code, token.start, 1, &[]);
    }

    /// Tokens from the current one onwards, without consuming anything.
    fn ahead(&self) -> impl Iterator<Item = SyntaxToken> + 'a {
        Self::tokens_from(self.text, self.language, self.position)
    }

    fn tokens_from(text: &'a str, language: Language, start: SourceLocation) -> impl Iterator<Item = SyntaxToken> + 'a {
        let mut location = start;
        std::iter::from_fn(move || {
            let token = lex_at(text, language, location)?;
            location = token.end();
            Some(token)
        })
    }

    /// The token after the current one.
    fn peek(&self) -> Option<SyntaxToken> {
        self.ahead().nth(1)
    }

    /// The first token after the current one that is not a space or tab.
    fn peek_past_whitespace(&self) -> Option<SyntaxToken> {
        self.ahead()
            .skip(1)
            .find(|token| !(token.kind.is_whitespace() && !token.kind.is_newline()))
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index..)?.chars().next()
    }

    fn char_before(&self, index: usize) -> Option<char> {
        self.text.get(..index)?.chars().next_back()
    }

    /// True if only spaces and tabs separate `index` from the start of its line.
    fn at_line_start(&self, index: usize) -> bool {
        self.line_whitespace_start(index).is_some()
    }

    /// Where the run of spaces and tabs ending at `index` begins, if that run
    /// starts a line.
    fn line_whitespace_start(&self, index: usize) -> Option<usize> {
        let before = self.text.get(..index)?;
        let trimmed = before.trim_end_matches([' ', '\t', '\u{000C}']);
        match trimmed.chars().next_back() {
            None | Some('\n') | Some('\r') => Some(trimmed.len()),
            Some(_) => None,
        }
    }

    // === Spans and blocks ===

    fn top(&mut self) -> &mut BlockFrame {
        if self.blocks.is_empty() {
            self.blocks.push(BlockFrame::new(
                BlockKind::Markup,
                BlockChunkGenerator::None,
                SourceLocation::ZERO,
            ));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Outputs the pending tokens as a span, even if there are none.
    fn output_span(&mut self, kind: SpanKind, generator: SpanChunkGenerator, accepted: AcceptedCharacters) {
        let tokens = std::mem::take(&mut self.pending);
        let start = self.position;
        let span = Span::new(kind, tokens, start, generator, accepted);
        self.top().children.push(span.into());
    }

    /// Outputs the pending tokens as a span if there are any.
    fn output(&mut self, kind: SpanKind, generator: SpanChunkGenerator, accepted: AcceptedCharacters) {
        if self.has_pending() {
            self.output_span(kind, generator, accepted);
        }
    }

    fn output_markup(&mut self) {
        self.output(SpanKind::Markup, SpanChunkGenerator::Markup, AcceptedCharacters::Any);
    }

    fn output_transition(&mut self) {
        self.output(SpanKind::Transition, SpanChunkGenerator::None, AcceptedCharacters::None);
    }

    fn output_meta_code(&mut self) {
        self.output(SpanKind::MetaCode, SpanChunkGenerator::None, AcceptedCharacters::None);
    }

    /// Outputs pending tokens with the defaults for the current language.
    fn flush(&mut self) {
        match self.language {
            Language::Html => self.output_markup(),
            Language::CSharp => self.output(SpanKind::Code, SpanChunkGenerator::Statement, AcceptedCharacters::Any),
        }
    }

    fn start_block(&mut self, kind: BlockKind, generator: BlockChunkGenerator) {
        self.flush();
        let start = self.position;
        self.blocks.push(BlockFrame::new(kind, generator, start));
    }

    fn end_block(&mut self) {
        self.flush();
        if self.blocks.len() <= 1 {
            debug_assert!(false, "attempted to close the root block");
            return;
        }
        if let Some(frame) = self.blocks.pop() {
            let block = frame.finish();
            self.top().children.push(block.into());
        }
    }

    fn set_block_generator(&mut self, generator: BlockChunkGenerator) {
        self.top().generator = generator;
    }

    /// Outputs `tokens` as the opening span of the current block.
    fn output_tokens(
        &mut self,
        tokens: Vec<SyntaxToken>,
        kind: SpanKind,
        generator: SpanChunkGenerator,
        accepted: AcceptedCharacters,
    ) {
        if tokens.is_empty() {
            return;
        }
        debug_assert!(self.pending.is_empty());
        let start = tokens[0].start;
        let span = Span::new(kind, tokens, start, generator, accepted);
        self.top().children.push(span.into());
    }

    /// Removes the pending whitespace that runs from the start of the line up
    /// to the current position, if the whole run is pending.
    fn take_line_leading_whitespace(&mut self) -> Vec<SyntaxToken> {
        let index = self.position.absolute_index;
        let Some(line_start) = self.line_whitespace_start(index) else {
            return Vec::new();
        };
        if line_start == index {
            return Vec::new();
        }
        let mut split = self.pending.len();
        while split > 0 {
            let token = &self.pending[split - 1];
            if !(token.kind.is_whitespace() && !token.kind.is_newline()) {
                break;
            }
            split -= 1;
            if token.start.absolute_index == line_start {
                return self.pending.split_off(split);
            }
        }
        Vec::new()
    }

    /// Accepts trailing spaces and a line break if nothing else follows on
    /// the line.
    fn capture_whitespace_to_end_of_line(&mut self) {
        let mut ahead = self.ahead();
        let ends_line = loop {
            match ahead.next() {
                Some(token) if token.kind.is_newline() => break true,
                Some(token) if token.kind.is_whitespace() => continue,
                _ => break false,
            }
        };
        if ends_line {
            self.accept_whitespace();
            self.advance();
        }
    }

    // === Diagnostics ===

    fn diagnostic(&self, code: DiagnosticCode, start: SourceLocation, length: usize, args: &[&str]) -> RazorDiagnostic {
        RazorDiagnostic::new(code, self.source.span(start, length), args)
    }

    /// Records a diagnostic on the tree.
    fn error(&mut self, code: DiagnosticCode, start: SourceLocation, length: usize, args: &[&str]) {
        let diagnostic = self.diagnostic(code, start, length, args);
        self.diagnostics.push(diagnostic);
    }

    /// Records a diagnostic on the innermost open block.
    fn block_error(&mut self, code: DiagnosticCode, start: SourceLocation, length: usize, args: &[&str]) {
        let diagnostic = self.diagnostic(code, start, length, args);
        self.top().diagnostics.push(diagnostic);
    }

    /// Length of the current token, or 1 at end of file.
    fn current_length(&self) -> usize {
        self.current.as_ref().map_or(1, SyntaxToken::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(text: &str) -> (RazorSourceDocument, Arc<RazorParserOptions>) {
        (
            RazorSourceDocument::new(text, None),
            Arc::new(RazorParserOptions::new(crate::RazorLanguageVersion::V3_0)),
        )
    }

    #[test]
    fn test_line_whitespace_start() {
        let (source, options) = parser("a\n  @x");
        let parser = Parser::new(&source, options);
        assert_eq!(parser.line_whitespace_start(4), Some(2));
        assert_eq!(parser.line_whitespace_start(1), None);
        assert!(parser.at_line_start(0));
    }

    #[test]
    fn test_language_switch_relexes_current_token() {
        let (source, options) = parser("@\"x\"");
        let mut parser = Parser::new(&source, options);
        assert!(parser.at_html(HtmlTokenKind::Transition));
        parser.set_language(Language::CSharp);
        assert!(parser.at_cs(CSharpTokenKind::StringLiteral));
        assert_eq!(parser.current_text(), "@\"x\"");
    }

    #[test]
    fn test_unterminated_literal_reported_on_accept() {
        let (source, options) = parser("\"abc");
        let mut parser = Parser::new(&source, options);
        parser.set_language(Language::CSharp);
        parser.advance();
        assert_eq!(parser.diagnostics.len(), 1);
        assert_eq!(parser.diagnostics[0].id(), "RZ1000");
        assert!(parser.at_end());
    }
}
