//! Markup mode: text, tags, attributes and comments.

use super::Parser;
use crate::syntax::{AcceptedCharacters, BlockChunkGenerator, BlockKind, LocationTagged, SpanChunkGenerator, SpanKind};
use crate::tokenizer::{HtmlTokenKind, Language, SyntaxToken, TokenKind};
use razor_diagnostics::DiagnosticCode;
use smol_str::SmolStr;
use source_map::SourceLocation;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// What a parsed tag turned out to be.
pub(super) struct ParsedTag {
    pub(super) name: SmolStr,
    pub(super) name_start: SourceLocation,
    pub(super) is_end: bool,
    pub(super) self_closing: bool,
    /// False if the tag ran into end of file or another `<` before its `>`.
    pub(super) complete: bool,
}

impl Parser<'_> {
    pub(super) fn parse_markup_document(&mut self) {
        self.set_language(Language::Html);
        while !self.at_end() {
            self.parse_markup_step();
        }
        self.output_markup();
    }

    /// Markup up to an unbalanced `}`, which is left as the current token.
    pub(super) fn parse_markup_until_close_brace(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::Html(HtmlTokenKind::RightBrace) if depth == 0 => break,
                TokenKind::Html(HtmlTokenKind::RightBrace) => {
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Html(HtmlTokenKind::LeftBrace) => {
                    depth += 1;
                    self.advance();
                }
                _ => self.parse_markup_step(),
            }
        }
        self.output_markup();
    }

    /// Markup up to and including the next line break.
    pub(super) fn parse_markup_line(&mut self) {
        while !self.at_end() {
            if self.at_newline() {
                self.advance();
                break;
            }
            self.parse_markup_step();
        }
        self.output_markup();
    }

    /// Parses one markup construct, always consuming at least one token.
    pub(super) fn parse_markup_step(&mut self) {
        match self.current_kind() {
            None => {}
            Some(TokenKind::Html(HtmlTokenKind::Transition)) => self.parse_markup_transition(true),
            Some(TokenKind::Html(HtmlTokenKind::OpenAngle)) => self.parse_markup_angle(),
            Some(_) => self.advance(),
        }
    }

    /// At an `@` in markup: an escape, a comment, an email address or code.
    pub(super) fn parse_markup_transition(&mut self, allow_directives: bool) {
        let index = self.position.absolute_index;
        match self.char_at(index + 1) {
            Some('@') => {
                self.output_markup();
                self.advance();
                self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::None);
                self.advance();
            }
            Some('*') => {
                self.output_markup();
                self.parse_razor_comment();
            }
            next => {
                let is_email = self.char_before(index).is_some_and(char::is_alphanumeric)
                    && next.is_some_and(char::is_alphanumeric);
                if is_email {
                    self.advance();
                } else {
                    self.parse_code_from_markup(allow_directives);
                }
            }
        }
    }

    /// `@* ... *@`, in either language.
    pub(super) fn parse_razor_comment(&mut self) {
        self.flush();
        self.start_block(BlockKind::Comment, BlockChunkGenerator::RazorComment);
        let start = self.position;
        self.advance_raw(TokenKind::RazorCommentTransition, 1);
        self.output_transition();
        self.advance_raw(TokenKind::RazorCommentStar, 1);
        self.output_meta_code();

        let body_start = self.position.absolute_index;
        let rest = self.text.get(body_start..).unwrap_or_default();
        match rest.find("*@") {
            Some(end) => {
                self.advance_raw(TokenKind::RazorComment, end);
                self.output_span(SpanKind::Comment, SpanChunkGenerator::None, AcceptedCharacters::Any);
                self.advance_raw(TokenKind::RazorCommentStar, 1);
                self.output_meta_code();
                self.advance_raw(TokenKind::RazorCommentTransition, 1);
                self.output_transition();
            }
            None => {
                self.advance_raw(TokenKind::RazorComment, rest.len());
                self.output_span(SpanKind::Comment, SpanChunkGenerator::None, AcceptedCharacters::Any);
                self.error(DiagnosticCode::UnterminatedRazorComment, start, 2, &[]);
            }
        }
        self.end_block();
    }

    fn parse_markup_angle(&mut self) {
        let index = self.position.absolute_index;
        let rest = self.text.get(index..).unwrap_or_default();
        match self.peek().map(|token| token.kind) {
            Some(TokenKind::Html(HtmlTokenKind::Bang)) if rest.starts_with("<!--") => self.parse_html_comment(),
            Some(TokenKind::Html(HtmlTokenKind::Bang)) if rest.starts_with("<![CDATA[") => {
                self.accept_markup_declaration("]]>")
            }
            Some(TokenKind::Html(HtmlTokenKind::Bang | HtmlTokenKind::QuestionMark)) => {
                self.accept_markup_declaration(">")
            }
            Some(TokenKind::Html(HtmlTokenKind::Text | HtmlTokenKind::ForwardSlash)) => {
                self.parse_tag();
            }
            _ => self.advance(),
        }
    }

    /// `<!DOCTYPE ...>`, `<?xml ...?>` and CDATA sections are plain markup.
    fn accept_markup_declaration(&mut self, terminator: &str) {
        let index = self.position.absolute_index;
        let end = self
            .text
            .get(index..)
            .and_then(|rest| rest.find(terminator))
            .map(|offset| index + offset + terminator.len());
        match end {
            Some(end) => {
                while !self.at_end() && self.position.absolute_index < end {
                    self.advance();
                }
            }
            None => self.advance(),
        }
    }

    fn parse_html_comment(&mut self) {
        self.output_markup();
        self.start_block(BlockKind::HtmlComment, BlockChunkGenerator::None);
        // `<`, `!`, `--`
        for _ in 0..3 {
            self.advance();
        }
        self.output_markup();
        while !self.at_end() {
            let closes = self.at_html(HtmlTokenKind::DoubleHyphen)
                && self
                    .peek()
                    .is_some_and(|token| token.is_html(HtmlTokenKind::CloseAngle));
            if closes {
                self.output_markup();
                self.advance();
                self.advance();
                self.output_markup();
                break;
            }
            if self.at_html(HtmlTokenKind::Transition) {
                self.parse_markup_transition(false);
            } else {
                self.advance();
            }
        }
        self.end_block();
    }

    /// Parses one start or end tag into its own tag block.
    pub(super) fn parse_tag(&mut self) -> ParsedTag {
        self.output_markup();
        self.start_block(BlockKind::Tag, BlockChunkGenerator::None);
        self.advance(); // `<`
        let is_end = self.at_html(HtmlTokenKind::ForwardSlash);
        if is_end {
            self.advance();
        }
        let name_start = self.position;
        let name = if self.at_html(HtmlTokenKind::Text) {
            let name = SmolStr::new(self.current_text());
            self.advance();
            name
        } else {
            SmolStr::default()
        };

        let mut self_closing = false;
        let mut complete = false;
        if is_end {
            while !self.at_end() && !self.at_html(HtmlTokenKind::OpenAngle) {
                complete = self.at_html(HtmlTokenKind::CloseAngle);
                self.advance();
                if complete {
                    break;
                }
            }
        } else if let Some(closing) = self.parse_start_tag_rest() {
            self_closing = closing;
            complete = true;
        }
        self.end_block();
        ParsedTag {
            name,
            name_start,
            is_end,
            self_closing,
            complete,
        }
    }

    /// `<text>` and `</text>` around markup in code are transitions.
    fn parse_text_tag(&mut self) -> ParsedTag {
        self.output_markup();
        self.start_block(BlockKind::Tag, BlockChunkGenerator::None);
        self.advance(); // `<`
        let is_end = self.at_html(HtmlTokenKind::ForwardSlash);
        if is_end {
            self.advance();
        }
        let name_start = self.position;
        let name = SmolStr::new(self.current_text());
        self.advance();

        let mut has_attributes = false;
        let mut self_closing = false;
        let mut complete = false;
        while !self.at_end() && !self.at_html(HtmlTokenKind::OpenAngle) {
            if self.at_html(HtmlTokenKind::CloseAngle) {
                self.advance();
                complete = true;
                break;
            }
            if self.at_html(HtmlTokenKind::ForwardSlash)
                && self
                    .peek()
                    .is_some_and(|token| token.is_html(HtmlTokenKind::CloseAngle))
            {
                self.advance();
                self.advance();
                self_closing = true;
                complete = true;
                break;
            }
            if !self.current.as_ref().is_some_and(|token| token.kind.is_whitespace()) {
                has_attributes = true;
            }
            self.advance();
        }
        if has_attributes {
            self.error(DiagnosticCode::TextTagCannotContainAttributes, name_start, name.len(), &[]);
        }
        self.output_transition();
        self.end_block();
        ParsedTag {
            name,
            name_start,
            is_end,
            self_closing,
            complete,
        }
    }

    /// Attributes and the closing `>` or `/>` of a start tag. Returns whether
    /// the tag is self-closing, or `None` if it never closes.
    fn parse_start_tag_rest(&mut self) -> Option<bool> {
        loop {
            let kind = self.current_kind()?;
            match kind {
                TokenKind::Html(HtmlTokenKind::CloseAngle) => {
                    self.advance();
                    return Some(false);
                }
                TokenKind::Html(HtmlTokenKind::ForwardSlash)
                    if self
                        .peek()
                        .is_some_and(|token| token.is_html(HtmlTokenKind::CloseAngle)) =>
                {
                    self.advance();
                    self.advance();
                    return Some(true);
                }
                TokenKind::Html(HtmlTokenKind::OpenAngle) => return None,
                TokenKind::Html(HtmlTokenKind::WhiteSpace | HtmlTokenKind::NewLine) => {
                    if self.attribute_follows() {
                        self.parse_attribute();
                    } else {
                        self.advance();
                    }
                }
                TokenKind::Html(HtmlTokenKind::Transition) => self.parse_markup_transition(false),
                _ => self.advance(),
            }
        }
    }

    fn attribute_follows(&self) -> bool {
        self.ahead()
            .find(|token| !token.kind.is_whitespace())
            .is_some_and(|token| token.is_html(HtmlTokenKind::Text))
    }

    /// An attribute starting at the whitespace before its name.
    fn parse_attribute(&mut self) {
        let prefix_start = self.position;
        let mut ahead = self.ahead().skip_while(|token| token.kind.is_whitespace()).peekable();
        let mut name = String::new();
        while let Some(token) = ahead.next_if(|token| token.is_html(HtmlTokenKind::Text)) {
            name.push_str(&token.content);
        }
        let has_value = ahead
            .find(|token| !token.kind.is_whitespace())
            .is_some_and(|token| token.is_html(HtmlTokenKind::Equals));

        if !has_value {
            // Minimized: plain markup.
            self.accept_all_whitespace();
            self.accept_while(|token| token.is_html(HtmlTokenKind::Text));
            return;
        }

        let data_dash = name.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("data-"));
        if data_dash && !self.options.feature_flags.allow_conditional_data_dash_attributes {
            self.parse_plain_attribute();
            return;
        }

        self.output_markup();
        self.start_block(BlockKind::Markup, BlockChunkGenerator::None);
        let quote = self.accept_attribute_prefix();
        let prefix = LocationTagged::new(SmolStr::new(self.pending_text(0)), prefix_start);
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::Any);

        self.parse_attribute_value(quote);

        let suffix_start = self.position;
        let suffix = match quote {
            Some(quote) if self.at_html(quote) => {
                let text = SmolStr::new(self.current_text());
                self.advance();
                text
            }
            _ => SmolStr::default(),
        };
        self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::None);
        self.set_block_generator(BlockChunkGenerator::Attribute {
            name: name.into(),
            prefix,
            suffix: LocationTagged::new(suffix, suffix_start),
        });
        self.end_block();
    }

    /// Accepts `ws name ws = ws` and an opening quote, returning the quote kind.
    fn accept_attribute_prefix(&mut self) -> Option<HtmlTokenKind> {
        self.accept_all_whitespace();
        self.accept_while(|token| token.is_html(HtmlTokenKind::Text));
        self.accept_all_whitespace();
        self.advance(); // `=`
        self.accept_all_whitespace();
        match self.current_kind() {
            Some(TokenKind::Html(quote @ (HtmlTokenKind::DoubleQuote | HtmlTokenKind::SingleQuote))) => {
                self.advance();
                Some(quote)
            }
            _ => None,
        }
    }

    /// An attribute that is not conditional. Code in its value is still
    /// parsed.
    fn parse_plain_attribute(&mut self) {
        let quote = self.accept_attribute_prefix();
        while !self.at_attribute_value_end(quote) {
            if self.at_html(HtmlTokenKind::Transition) {
                self.parse_markup_transition(false);
            } else {
                self.advance();
            }
        }
        if let Some(quote) = quote {
            if self.at_html(quote) {
                self.advance();
            }
        }
    }

    fn at_attribute_value_end(&self, quote: Option<HtmlTokenKind>) -> bool {
        let Some(token) = self.current.as_ref() else {
            return true;
        };
        match quote {
            Some(quote) => token.is_html(quote),
            None => match token.kind {
                TokenKind::Html(
                    HtmlTokenKind::WhiteSpace
                    | HtmlTokenKind::NewLine
                    | HtmlTokenKind::CloseAngle
                    | HtmlTokenKind::OpenAngle,
                ) => true,
                TokenKind::Html(HtmlTokenKind::ForwardSlash) => self
                    .peek()
                    .is_some_and(|token| token.is_html(HtmlTokenKind::CloseAngle)),
                _ => false,
            },
        }
    }

    /// Splits a conditional attribute value into literal and dynamic
    /// segments, each owning the whitespace before it.
    fn parse_attribute_value(&mut self, quote: Option<HtmlTokenKind>) {
        while !self.at_attribute_value_end(quote) {
            let segment_start = self.position;
            while self.current.as_ref().is_some_and(|token| token.kind.is_whitespace())
                && !self.at_attribute_value_end(quote)
            {
                self.advance();
            }
            let prefix_tokens = self.pending.len();
            let prefix = LocationTagged::new(SmolStr::new(self.pending_text(0)), segment_start);
            let value_start = self.position;

            if self.at_attribute_value_end(quote) {
                let value = LocationTagged::new(SmolStr::default(), value_start);
                self.output(
                    SpanKind::Markup,
                    SpanChunkGenerator::LiteralAttribute { prefix, value },
                    AcceptedCharacters::Any,
                );
                break;
            }

            if self.at_html(HtmlTokenKind::Transition) {
                let index = self.position.absolute_index;
                if self.char_at(index + 1) == Some('@') {
                    // `@@` writes a single `@`.
                    self.advance();
                    let value = LocationTagged::new(SmolStr::new("@"), value_start);
                    self.output(
                        SpanKind::Markup,
                        SpanChunkGenerator::LiteralAttribute { prefix, value },
                        AcceptedCharacters::None,
                    );
                    self.advance();
                    self.output(SpanKind::Markup, SpanChunkGenerator::None, AcceptedCharacters::None);
                    continue;
                }
                if !self.at_email_transition() {
                    let whitespace: Vec<SyntaxToken> = std::mem::take(&mut self.pending);
                    self.start_block(
                        BlockKind::Markup,
                        BlockChunkGenerator::DynamicAttribute {
                            prefix,
                            value_start,
                        },
                    );
                    self.output_tokens(
                        whitespace,
                        SpanKind::Markup,
                        SpanChunkGenerator::None,
                        AcceptedCharacters::Any,
                    );
                    if self.char_at(index + 1) == Some('*') {
                        self.parse_razor_comment();
                    } else {
                        self.parse_code_from_markup(false);
                    }
                    self.end_block();
                    continue;
                }
            }

            loop {
                if self.at_attribute_value_end(quote)
                    || self.current.as_ref().is_some_and(|token| token.kind.is_whitespace())
                {
                    break;
                }
                if self.at_html(HtmlTokenKind::Transition) && !self.at_email_transition() {
                    break;
                }
                self.advance();
            }
            let value = LocationTagged::new(SmolStr::new(self.pending_text(prefix_tokens)), value_start);
            self.output(
                SpanKind::Markup,
                SpanChunkGenerator::LiteralAttribute { prefix, value },
                AcceptedCharacters::Any,
            );
        }
    }

    fn at_email_transition(&self) -> bool {
        let index = self.position.absolute_index;
        self.char_before(index).is_some_and(char::is_alphanumeric)
            && self.char_at(index + 1).is_some_and(char::is_alphanumeric)
    }

    /// The name of the tag starting at the current `<`, and whether it is an
    /// end tag.
    fn peek_tag_name(&self) -> (bool, SmolStr) {
        let mut ahead = self.ahead().skip(1).peekable();
        let is_end = ahead
            .next_if(|token| token.is_html(HtmlTokenKind::ForwardSlash))
            .is_some();
        let name = ahead
            .next()
            .filter(|token| token.is_html(HtmlTokenKind::Text))
            .map(|token| token.content)
            .unwrap_or_default();
        (is_end, name)
    }

    /// Parses a single element with everything nested in it. Used for markup
    /// inside code and for templates.
    pub(super) fn parse_element(&mut self) {
        let mut stack: Vec<(SmolStr, SourceLocation)> = Vec::new();
        let mut text_element = false;
        let mut started = false;
        while !self.at_end() {
            if started && stack.is_empty() {
                break;
            }
            let is_tag = self.at_html(HtmlTokenKind::OpenAngle)
                && self.peek().is_some_and(|token| {
                    token.is_html(HtmlTokenKind::Text) || token.is_html(HtmlTokenKind::ForwardSlash)
                });
            started = true;
            if !is_tag {
                self.parse_markup_step();
                continue;
            }

            let (is_end, name) = self.peek_tag_name();
            let is_text_transition = name == "text"
                && ((stack.is_empty() && !is_end) || (is_end && text_element && stack.len() == 1));
            let tag = if is_text_transition {
                text_element = true;
                self.parse_text_tag()
            } else {
                self.parse_tag()
            };

            if !tag.complete {
                self.error(
                    DiagnosticCode::UnfinishedTag,
                    tag.name_start,
                    tag.name.len().max(1),
                    &[tag.name.as_str()],
                );
            }
            if tag.is_end {
                match stack
                    .iter()
                    .rposition(|(open, _)| open.eq_ignore_ascii_case(&tag.name))
                {
                    Some(index) => stack.truncate(index),
                    None => self.error(
                        DiagnosticCode::UnexpectedEndTag,
                        tag.name_start,
                        tag.name.len().max(1),
                        &[tag.name.as_str()],
                    ),
                }
            } else if tag.complete && !tag.self_closing && !is_void_element(&tag.name) {
                stack.push((tag.name, tag.name_start));
            }
        }
        self.output_markup();
        if let Some((name, start)) = stack.first() {
            let name = name.clone();
            self.error(DiagnosticCode::MissingEndTag, *start, name.len().max(1), &[name.as_str()]);
        }
    }
}
