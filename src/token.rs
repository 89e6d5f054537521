/// Inclusive range of token indices into a file's token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span. `end` is clamped so it never precedes `start`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    /// Number of tokens covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A span always covers at least one token.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Text outside `<?php ... ?>`.
    InlineHtml,
    /// `<?php`, `<?=` or `<?`.
    OpenTag,
    /// `?>` (with one trailing newline, if any).
    CloseTag,
    /// Run of spaces, tabs, and newlines.
    Whitespace,
    /// `// ...`, `# ...` or `/* ... */`.
    Comment,
    /// `/** ... */`.
    DocComment,

    Namespace,
    Use,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Public,
    Protected,
    Private,
    Abstract,
    Final,
    Static,
    Var,
    Const,
    Readonly,
    Extends,
    Implements,
    New,

    /// Identifier or `\`-qualified name.
    Name,
    /// `$name`.
    Variable,
    /// Integer or float literal.
    Number,
    /// Quoted, backtick, heredoc, or nowdoc string (quotes included).
    String,

    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// `#[` attribute opener, closed by `CloseBracket`.
    OpenAttribute,
    Semicolon,
    Comma,
    Equals,
    Ampersand,
    Ellipsis,
    Question,
    Pipe,
    Colon,
    /// `::`.
    DoubleColon,
    /// `->` or `?->`.
    ObjectOperator,
    /// Anything else, preserved verbatim.
    Other,
}

impl TokenKind {
    /// Whitespace and comments.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment | Self::DocComment)
    }

    /// Tokens the scanners never need to look at.
    #[must_use]
    pub const fn is_insignificant(self) -> bool {
        self.is_trivia() || matches!(self, Self::InlineHtml | Self::OpenTag | Self::CloseTag)
    }

    /// Visibility, `static`, `abstract`, `final`, `var`, and `readonly`.
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::Protected
                | Self::Private
                | Self::Abstract
                | Self::Final
                | Self::Static
                | Self::Var
                | Self::Readonly
        )
    }

    /// Resolve a case-insensitive keyword to its kind.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "namespace" => Self::Namespace,
            "use" => Self::Use,
            "class" => Self::Class,
            "interface" => Self::Interface,
            "trait" => Self::Trait,
            "enum" => Self::Enum,
            "function" => Self::Function,
            "public" => Self::Public,
            "protected" => Self::Protected,
            "private" => Self::Private,
            "abstract" => Self::Abstract,
            "final" => Self::Final,
            "static" => Self::Static,
            "var" => Self::Var,
            "const" => Self::Const,
            "readonly" => Self::Readonly,
            "extends" => Self::Extends,
            "implements" => Self::Implements,
            "new" => Self::New,
            _ => return None,
        };
        Some(kind)
    }
}

/// A single token with its kind, verbatim text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first byte.
    pub line: usize,
    /// Byte offset of the first byte in the scanned source.
    pub offset: usize,
}

impl Token {
    /// Byte offset one past the last byte.
    #[must_use]
    pub const fn end_offset(&self) -> usize {
        self.offset + self.text.len()
    }
}
