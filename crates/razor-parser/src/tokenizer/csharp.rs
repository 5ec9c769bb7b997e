//! Code tokens for the embedded C# sublanguage.
//!
//! Unterminated string, character and block comment literals lex to the same
//! kinds as their terminated forms; the parser reports them.

use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
pub enum CSharpTokenKind {
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Identifier,

    /// An identifier found in [`CSharpKeyword`]. Produced by the tokenizer
    /// wrapper, never by the lexer itself.
    Keyword,

    #[regex(r"[0-9][0-9_]*([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+([uU][lL]?|[lL][uU]?)?")]
    #[regex(r"0[bB][01_]+([uU][lL]?|[lL][uU]?)?")]
    IntegerLiteral,

    #[regex(r"[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?[fFdDmM]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFdDmM]?")]
    #[regex(r"[0-9]+[fFdDmM]")]
    RealLiteral,

    #[regex(r#""([^"\\\r\n]|\\.)*"?"#)]
    #[regex(r#"@"([^"]|"")*"?"#)]
    #[regex(r#"\$"([^"\\\r\n]|\\.)*"?"#)]
    #[regex(r#"(\$@|@\$)"([^"]|"")*"?"#)]
    StringLiteral,

    #[regex(r"'([^'\\\r\n]|\\.)*'?")]
    CharacterLiteral,

    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    Comment,

    #[regex(r"[ \t\f]+")]
    WhiteSpace,

    #[regex(r"\r\n|\r|\n")]
    NewLine,

    #[token("@")]
    Transition,

    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    QuestionMark,
    #[token("??")]
    NullCoalesce,
    #[token("??=")]
    NullCoalesceAssign,
    #[token(":")]
    Colon,
    #[token("::")]
    DoubleColon,
    #[token("=")]
    Assign,
    #[token("==")]
    Equals,
    #[token("!=")]
    NotEqual,
    #[token("=>")]
    Arrow,
    /// `<`; also the start of markup inside code.
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEqual,
    #[token("<<")]
    LeftShift,
    #[token("<<=")]
    LeftShiftAssign,
    /// `>`. There is no `>>` token so nested generic arguments balance.
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEqual,
    #[token("+")]
    Plus,
    #[token("++")]
    Increment,
    #[token("+=")]
    PlusAssign,
    #[token("-")]
    Minus,
    #[token("--")]
    Decrement,
    #[token("-=")]
    MinusAssign,
    #[token("->")]
    PointerArrow,
    #[token("*")]
    Star,
    #[token("*=")]
    MultiplyAssign,
    #[token("/")]
    Slash,
    #[token("/=")]
    DivideAssign,
    #[token("%")]
    Modulo,
    #[token("%=")]
    ModuloAssign,
    #[token("&")]
    And,
    #[token("&&")]
    DoubleAnd,
    #[token("&=")]
    AndAssign,
    #[token("|")]
    Or,
    #[token("||")]
    DoubleOr,
    #[token("|=")]
    OrAssign,
    #[token("^")]
    Xor,
    #[token("^=")]
    XorAssign,
    #[token("!")]
    Not,
    #[token("~")]
    Tilde,
    #[token("#")]
    Hash,

    /// A character no other rule accepts.
    Unknown,
}

impl CSharpTokenKind {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, CSharpTokenKind::WhiteSpace | CSharpTokenKind::NewLine)
    }

    pub fn is_identifier_or_keyword(&self) -> bool {
        matches!(self, CSharpTokenKind::Identifier | CSharpTokenKind::Keyword)
    }
}

/// Returns true if a string or character literal token is closed.
pub fn is_terminated_literal(kind: CSharpTokenKind, content: &str) -> bool {
    match kind {
        CSharpTokenKind::StringLiteral => {
            let body = content.trim_start_matches(['$', '@']);
            let verbatim = content[..content.len() - body.len()].contains('@');
            if body.len() < 2 || !body.ends_with('"') {
                return false;
            }
            if verbatim {
                // `""` is an escaped quote inside verbatim strings.
                let inner = &body[1..];
                let trailing = inner.chars().rev().take_while(|c| *c == '"').count();
                trailing % 2 == 1
            } else {
                !ends_with_escape(&body[..body.len() - 1])
            }
        }
        CSharpTokenKind::CharacterLiteral => {
            content.len() >= 2 && content.ends_with('\'') && !ends_with_escape(&content[..content.len() - 1])
        }
        CSharpTokenKind::Comment => !content.starts_with("/*") || (content.len() >= 4 && content.ends_with("*/")),
        _ => true,
    }
}

fn ends_with_escape(text: &str) -> bool {
    // An odd number of trailing backslashes escapes the closing quote. The
    // opening quote is never a backslash so it can stay in `text`.
    text.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// C# keywords.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum CSharpKeyword {
            $($variant,)*
        }

        impl CSharpKeyword {
            pub fn lookup(text: &str) -> Option<CSharpKeyword> {
                match text {
                    $($text => Some(CSharpKeyword::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(CSharpKeyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Abstract => "abstract",
    As => "as",
    Await => "await",
    Base => "base",
    Bool => "bool",
    Break => "break",
    Byte => "byte",
    Case => "case",
    Catch => "catch",
    Char => "char",
    Checked => "checked",
    Class => "class",
    Const => "const",
    Continue => "continue",
    Decimal => "decimal",
    Default => "default",
    Delegate => "delegate",
    Do => "do",
    Double => "double",
    Else => "else",
    Enum => "enum",
    Event => "event",
    Explicit => "explicit",
    Extern => "extern",
    False => "false",
    Finally => "finally",
    Fixed => "fixed",
    Float => "float",
    For => "for",
    Foreach => "foreach",
    Goto => "goto",
    If => "if",
    Implicit => "implicit",
    In => "in",
    Int => "int",
    Interface => "interface",
    Internal => "internal",
    Is => "is",
    Lock => "lock",
    Long => "long",
    Namespace => "namespace",
    New => "new",
    Null => "null",
    Object => "object",
    Operator => "operator",
    Out => "out",
    Override => "override",
    Params => "params",
    Private => "private",
    Protected => "protected",
    Public => "public",
    Readonly => "readonly",
    Ref => "ref",
    Return => "return",
    Sbyte => "sbyte",
    Sealed => "sealed",
    Short => "short",
    Sizeof => "sizeof",
    Stackalloc => "stackalloc",
    Static => "static",
    String => "string",
    Struct => "struct",
    Switch => "switch",
    This => "this",
    Throw => "throw",
    True => "true",
    Try => "try",
    Typeof => "typeof",
    Uint => "uint",
    Ulong => "ulong",
    Unchecked => "unchecked",
    Unsafe => "unsafe",
    Ushort => "ushort",
    Using => "using",
    Virtual => "virtual",
    Void => "void",
    Volatile => "volatile",
    While => "while",
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> Vec<(CSharpTokenKind, &str)> {
        let mut lexer = CSharpTokenKind::lexer(source);
        let mut tokens = Vec::new();
        while let Some(kind) = lexer.next() {
            tokens.push((kind.unwrap_or(CSharpTokenKind::Unknown), lexer.slice()));
        }
        tokens
    }

    #[test]
    fn test_generic_closers_do_not_merge() {
        use CSharpTokenKind::*;
        assert_eq!(
            lex("List<List<int>>"),
            vec![
                (Identifier, "List"),
                (LessThan, "<"),
                (Identifier, "List"),
                (LessThan, "<"),
                (Identifier, "int"),
                (GreaterThan, ">"),
                (GreaterThan, ">"),
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        use CSharpTokenKind::*;
        assert_eq!(lex(r#""a\"b""#), vec![(StringLiteral, r#""a\"b""#)]);
        assert_eq!(lex(r#"@"a""b""#), vec![(StringLiteral, r#"@"a""b""#)]);
        assert_eq!(lex(r#"$"{x}""#), vec![(StringLiteral, r#"$"{x}""#)]);
        assert_eq!(
            lex("\"open\n"),
            vec![(StringLiteral, "\"open"), (NewLine, "\n")]
        );
    }

    #[test]
    fn test_literal_termination() {
        use CSharpTokenKind::*;
        assert!(is_terminated_literal(StringLiteral, r#""abc""#));
        assert!(!is_terminated_literal(StringLiteral, r#""abc"#));
        assert!(!is_terminated_literal(StringLiteral, "\""));
        assert!(!is_terminated_literal(StringLiteral, r#""a\""#));
        assert!(is_terminated_literal(StringLiteral, r#"@"a""b""#));
        assert!(is_terminated_literal(StringLiteral, r#"@"a""""#));
        assert!(!is_terminated_literal(StringLiteral, r#"@"a"""#));
        assert!(is_terminated_literal(CharacterLiteral, "'\\''"));
        assert!(!is_terminated_literal(CharacterLiteral, "'a"));
        assert!(is_terminated_literal(Comment, "/* x */"));
        assert!(!is_terminated_literal(Comment, "/* x"));
        assert!(is_terminated_literal(Comment, "// x"));
    }

    #[test]
    fn test_comments_and_numbers() {
        use CSharpTokenKind::*;
        assert_eq!(
            lex("1.5f /* c */ 42"),
            vec![
                (RealLiteral, "1.5f"),
                (WhiteSpace, " "),
                (Comment, "/* c */"),
                (WhiteSpace, " "),
                (IntegerLiteral, "42"),
            ]
        );
    }

    #[test]
    fn test_keyword_table() {
        assert_eq!(CSharpKeyword::lookup("foreach"), Some(CSharpKeyword::Foreach));
        assert_eq!(CSharpKeyword::lookup("section"), None);
        assert_eq!(CSharpKeyword::Using.as_str(), "using");
    }
}
