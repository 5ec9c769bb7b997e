//! Diagnostic types.

use smol_str::SmolStr;
use source_map::SourceSpan;
use std::fmt;

/// A recoverable problem found in user input.
///
/// Diagnostics never stop processing. The message is rendered lazily from the
/// code's format string and the stored arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RazorDiagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The source location.
    pub span: SourceSpan,
    /// Arguments substituted into the code's message format.
    pub args: Vec<SmolStr>,
}

impl RazorDiagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, span: SourceSpan, args: &[&str]) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            span,
            args: args.iter().map(|arg| SmolStr::new(arg)).collect(),
        }
    }

    /// Returns the stable id, e.g. `RZ1006`.
    pub fn id(&self) -> &'static str {
        self.code.as_str()
    }

    /// Renders the message.
    pub fn message(&self) -> String {
        format_message(self.code.message_format(), &self.args)
    }
}

impl fmt::Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.span.file_path.as_deref().unwrap_or("<unknown>");
        write!(
            f,
            "{}({},{}): {} {}: {}",
            file,
            self.span.line_index.wrapping_add(1),
            self.span.character_index.wrapping_add(1),
            self.severity,
            self.code,
            self.message()
        )
    }
}

fn format_message(format: &str, args: &[SmolStr]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let index = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|i| (i, close)));
        match index {
            Some((i, close)) => {
                out.push_str(args.get(i).map(SmolStr::as_str).unwrap_or(""));
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Reported but does not make the document invalid.
    Warning,
    /// The document cannot be compiled as written.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        })
    }
}

macro_rules! diagnostic_codes {
    ($(
        $(#[$meta:meta])*
        $name:ident = $id:literal, $severity:ident, $format:literal;
    )*) => {
        /// Diagnostic codes raised by the parser, the rewrite passes and
        /// descriptor validation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum DiagnosticCode {
            $( $(#[$meta])* $name, )*
        }

        impl DiagnosticCode {
            /// Every code in the catalog.
            pub const ALL: &'static [DiagnosticCode] = &[$(DiagnosticCode::$name,)*];

            /// Returns the default severity for this diagnostic code.
            pub fn default_severity(&self) -> Severity {
                match self {
                    $( DiagnosticCode::$name => Severity::$severity, )*
                }
            }

            /// Returns the diagnostic code as a string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( DiagnosticCode::$name => $id, )*
                }
            }

            /// The message format; `{n}` is replaced with the n-th argument.
            pub fn message_format(&self) -> &'static str {
                match self {
                    $( DiagnosticCode::$name => $format, )*
                }
            }
        }
    };
}

diagnostic_codes! {
    // === Parser ===
    UnterminatedStringLiteral = "RZ1000", Error,
        "Unterminated string literal. Strings that start with a quotation mark (\") must be terminated before the end of the line.";
    UnterminatedBlockComment = "RZ1001", Error,
        "End of file was reached before the end of the block comment. All comments started with \"/*\" must be terminated with \"*/\".";
    /// `@<p>@<b></b></p>`
    NestedTemplate = "RZ1002", Error,
        "Inline markup blocks (@<p>Content</p>) cannot be nested. Only one level of inline markup is allowed.";
    UnexpectedWhiteSpaceAtStartOfCodeBlock = "RZ1003", Error,
        "A space or line break was encountered after the \"@\" character. Only valid identifiers, keywords, comments, \"(\" and \"{\" are valid at the start of a code block and they must occur immediately following \"@\" with no space in between.";
    UnexpectedEndOfFileAtStartOfCodeBlock = "RZ1004", Error,
        "End-of-file was found after the \"@\" character. \"@\" must be followed by a valid code block.";
    UnexpectedCharacterAtStartOfCodeBlock = "RZ1005", Error,
        "\"{0}\" is not valid at the start of a code block. Only identifiers, keywords, comments, \"(\" and \"{\" are valid.";
    ExpectedEndOfBlockBeforeEof = "RZ1006", Error,
        "The {0} block is missing a closing \"{1}\" character. Make sure you have a matching \"{1}\" character for all the \"{2}\" characters within this block.";
    ReservedWord = "RZ1007", Error,
        "\"{0}\" is a reserved word and cannot be used in implicit expressions. An explicit expression (\"@()\") must be used.";
    SingleLineControlFlowStatementsNotAllowed = "RZ1008", Error,
        "Expected a \"{0}\" but found a \"{1}\". Block statements must be enclosed in \"{\" and \"}\".";
    AtInCodeMustBeFollowedByColonParenOrIdentifierStart = "RZ1009", Error,
        "The \"@\" character must be followed by a \":\", \"(\", or a C# identifier. If you intended to switch to markup, use an HTML start tag.";
    UnexpectedNestedCodeBlock = "RZ1010", Error,
        "Unexpected \"{\" after \"@\" character. Once inside the body of a code block you do not need to use \"@{\" to switch to code.";
    DirectiveExpectsTypeName = "RZ1011", Error,
        "The '{0}' directive expects a type name.";
    DirectiveExpectsNamespace = "RZ1012", Error,
        "The '{0}' directive expects a namespace name.";
    DirectiveExpectsIdentifier = "RZ1013", Error,
        "The '{0}' directive expects an identifier.";
    DirectiveExpectsQuotedStringLiteral = "RZ1014", Error,
        "The '{0}' directive expects a string surrounded by double quotes.";
    UnexpectedDirectiveLiteral = "RZ1015", Error,
        "Unexpected literal following the '{0}' directive. Expected '{1}'.";
    UnterminatedRazorComment = "RZ1016", Error,
        "End of file was reached before the end of the Razor comment. All comments started with \"@*\" must be terminated with \"*@\".";
    UnexpectedEofAfterDirective = "RZ1017", Error,
        "Unexpected end of file following the '{0}' directive. Expected '{1}'.";
    DirectiveMustHaveValue = "RZ1018", Error,
        "Directive '{0}' must have a value.";
    IncompleteQuotesAroundDirective = "RZ1019", Error,
        "Optional quote around the directive '{0}' is missing the corresponding opening or closing quote.";
    InvalidTagHelperPrefixValue = "RZ1020", Error,
        "Invalid tag helper directive '{0}' value. '{1}' is not allowed in prefix '{2}'.";
    ExpectedCloseBracketBeforeEof = "RZ1021", Error,
        "An opening \"{0}\" is missing the corresponding closing \"{1}\".";
    OuterTagMissingName = "RZ1022", Error,
        "Outer tag is missing a name. The first character of a markup block must be an HTML tag with a valid name.";
    TextTagCannotContainAttributes = "RZ1023", Error,
        "\"<text>\" and \"</text>\" tags cannot contain attributes.";
    UnfinishedTag = "RZ1024", Error,
        "End of file or an unexpected character was reached before the \"{0}\" tag could be parsed. Elements inside markup blocks must be complete.";
    MissingEndTag = "RZ1025", Error,
        "The \"{0}\" element was not closed. All elements must be either self-closing or have a matching end tag.";
    UnexpectedEndTag = "RZ1026", Error,
        "Encountered end tag \"{0}\" with no matching start tag. Are your start/end tags properly balanced?";
    DirectiveMustAppearAtStartOfLine = "RZ1028", Error,
        "The '{0}' directive must appear at the start of the line.";
    SectionsCannotBeNested = "RZ1029", Error,
        "Section blocks (\"{0}\") cannot be nested. Only one level of section blocks are allowed.";
    TagHelpersCannotHaveCSharpInTagDeclaration = "RZ1031", Error,
        "The tag helper '{0}' must not have C# in the element's attribute declaration area.";
    TagHelperMustNotHaveAnEndTag = "RZ1034", Error,
        "Found an end tag (</{0}>) for tag helper '{1}' with tag structure that disallows an end tag ('{2}').";
    TagHelperMissingCloseTag = "RZ1035", Error,
        "Found a malformed '{0}' tag helper. Tag helpers must have a start and end tag or be self closing.";
    InvalidTagHelperLookupText = "RZ1036", Error,
        "Invalid tag helper directive look up text '{0}'. The correct look up text format is: \"name, assemblyName\".";

    // === Semantic ===
    DuplicateDirective = "RZ2001", Error,
        "The '{0}' directive may only occur once per document.";
    TagHelperIndexerAttributeNameMustIncludeKey = "RZ2006", Error,
        "The tag helper attribute '{0}' in element '{1}' is missing a key. The syntax is '<{1} {0}{ key }=\"value\">'.";
    EmptyBoundAttribute = "RZ2008", Error,
        "Attribute '{0}' on tag helper element '{1}' requires a value. Tag helper bound attributes of type '{2}' cannot be empty or contain only whitespace.";
    InvalidHtmlContentInTagHelper = "RZ2009", Error,
        "The parent <{0}> tag helper does not allow non-tag content. Only child tag helper(s) targeting tag name(s) '{1}' are allowed.";
    InvalidNestedTag = "RZ2010", Error,
        "The <{0}> tag is not allowed by parent <{1}> tag helper. Only child tags with name(s) '{2}' are allowed.";

    // === Descriptor validation ===
    InvalidBoundAttributeName = "RZ3001", Error,
        "Invalid tag helper bound property '{0}' on tag helper '{1}'. Tag helpers cannot bind to HTML attributes with name '{2}' because the name contains a '{3}' character.";
    InvalidBoundAttributeNameStartsWith = "RZ3002", Error,
        "Invalid tag helper bound property '{0}' on tag helper '{1}'. Tag helpers cannot bind to HTML attributes with name '{2}' because the name starts with '{3}'.";
    InvalidBoundAttributeNullOrWhitespace = "RZ3003", Error,
        "Invalid tag helper bound property '{0}' on tag helper '{1}'. Tag helpers cannot bind to HTML attributes with a null or empty name.";
    InvalidBoundAttributePrefix = "RZ3004", Error,
        "Invalid tag helper bound property '{0}' on tag helper '{1}'. Tag helpers cannot bind to HTML attributes with prefix '{2}' because the prefix contains a '{3}' character.";
    InvalidTargetedTagName = "RZ3005", Error,
        "Tag helpers cannot target tag name '{0}' because it contains a '{1}' character.";
    InvalidTargetedTagNameNullOrWhitespace = "RZ3006", Error,
        "Tag name cannot be null or whitespace.";
    InvalidTargetedParentTagName = "RZ3007", Error,
        "Tag helpers cannot target parent tag name '{0}' because it contains a '{1}' character.";
    InvalidTargetedAttributeName = "RZ3008", Error,
        "Tag helpers cannot target attribute name '{0}' because it contains a '{1}' character.";
    InvalidTargetedAttributeNameNullOrWhitespace = "RZ3009", Error,
        "Targeted attribute name cannot be null or whitespace.";
    InvalidRestrictedChild = "RZ3010", Error,
        "Invalid restricted child '{0}' on tag helper '{1}'. Child names cannot contain a '{2}' character.";
    InvalidRestrictedChildNullOrWhitespace = "RZ3011", Error,
        "Invalid restricted child on tag helper '{0}'. Name cannot be null or whitespace.";
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
