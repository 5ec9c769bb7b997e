//! Markup tokens.
//!
//! Only the structure Razor needs is recognized; everything else is `Text`.

use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
pub enum HtmlTokenKind {
    /// A run of ordinary characters. A single `-` between text characters
    /// stays in the run so `my-tag` is one token; a lone `-` is its own
    /// text token.
    #[regex(r#"([^ \t\f\r\n<>!/?\[\]="'@{}\-]|-[^ \t\f\r\n<>!/?\[\]="'@{}\-])+"#)]
    #[token("-")]
    Text,

    #[regex(r"[ \t\f]+")]
    WhiteSpace,

    #[regex(r"\r\n|\r|\n")]
    NewLine,

    #[token("<")]
    OpenAngle,

    #[token(">")]
    CloseAngle,

    #[token("!")]
    Bang,

    #[token("/")]
    ForwardSlash,

    #[token("?")]
    QuestionMark,

    #[token("--")]
    DoubleHyphen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("=")]
    Equals,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    #[token("@")]
    Transition,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,
}

impl HtmlTokenKind {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, HtmlTokenKind::WhiteSpace | HtmlTokenKind::NewLine)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HtmlTokenKind::Text => "Text",
            HtmlTokenKind::WhiteSpace => "WhiteSpace",
            HtmlTokenKind::NewLine => "NewLine",
            HtmlTokenKind::OpenAngle => "OpenAngle",
            HtmlTokenKind::CloseAngle => "CloseAngle",
            HtmlTokenKind::Bang => "Bang",
            HtmlTokenKind::ForwardSlash => "ForwardSlash",
            HtmlTokenKind::QuestionMark => "QuestionMark",
            HtmlTokenKind::DoubleHyphen => "DoubleHyphen",
            HtmlTokenKind::LeftBracket => "LeftBracket",
            HtmlTokenKind::RightBracket => "RightBracket",
            HtmlTokenKind::Equals => "Equals",
            HtmlTokenKind::DoubleQuote => "DoubleQuote",
            HtmlTokenKind::SingleQuote => "SingleQuote",
            HtmlTokenKind::Transition => "Transition",
            HtmlTokenKind::LeftBrace => "LeftBrace",
            HtmlTokenKind::RightBrace => "RightBrace",
        }
    }
}
