use std::fmt;

use crate::options::ScanOptions;
use crate::token::{Token, TokenKind};

/// Classifies a lexer diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Quoted or backtick string never closed.
    UnterminatedString,
    /// `/* ...` never closed.
    UnterminatedComment,
    /// Heredoc or nowdoc whose closing marker never appears.
    UnterminatedHeredoc { marker: String },
    /// Control byte that cannot start any token; it is skipped.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string")
            }
            Self::UnterminatedComment => {
                write!(f, "unterminated block comment")
            }
            Self::UnterminatedHeredoc { marker } => {
                write!(
                    f,
                    "unterminated heredoc, \
                     expected closing marker: {marker}"
                )
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
        }
    }
}

/// Soft lexical problem. Lexing never stops on one of these; the
/// offending run is either closed at end of input or skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
}

/// Tokens plus the diagnostics gathered while producing them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexError>,
}

/// Tokenize PHP source text with default options.
///
/// Never fails: lexically broken input still yields a token sequence.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_with_options(input, &ScanOptions::new()).tokens
}

/// Tokenize PHP source text, keeping soft diagnostics.
#[must_use]
pub fn tokenize_with_options(input: &str, options: &ScanOptions) -> Lexed {
    let lexed = Lexer::new(strip_bom(input), options).tokenize();
    tracing::trace!(
        tokens = lexed.tokens.len(),
        diagnostics = lexed.diagnostics.len(),
        "tokenized source"
    );
    lexed
}

/// Token offsets are relative to the input with any UTF-8 BOM removed.
pub(crate) fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{FEFF}').unwrap_or(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Html,
    Code,
}

struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    mode: Mode,
    short_tags: bool,
    last_significant: Option<TokenKind>,
    tokens: Vec<Token>,
    diagnostics: Vec<LexError>,
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

const fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, options: &ScanOptions) -> Self {
        Self {
            src,
            input: src.as_bytes(),
            pos: 0,
            line: 1,
            mode: if options.start_in_code {
                Mode::Code
            } else {
                Mode::Html
            },
            short_tags: options.short_open_tags,
            last_significant: None,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Lexed {
        while self.pos < self.input.len() {
            match self.mode {
                Mode::Html => self.lex_html(),
                Mode::Code => self.lex_code(),
            }
        }

        Lexed {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = self.src[start..self.pos].to_string();
        let line = self.line;
        self.line += text.bytes().filter(|&b| b == b'\n').count();
        if !kind.is_trivia() {
            self.last_significant = Some(kind);
        }
        self.tokens.push(Token {
            kind,
            text,
            line,
            offset: start,
        });
    }

    fn report(&mut self, kind: LexErrorKind, line: usize) {
        tracing::debug!(line, error = %kind, "malformed source");
        self.diagnostics.push(LexError { kind, line });
    }

    fn lex_html(&mut self) {
        let start = self.pos;
        let mut scan = self.pos;

        while let Some(found) = find(&self.input[scan..], b"<?") {
            let at = scan + found;
            if let Some(len) = self.open_tag_len(at) {
                if at > start {
                    self.pos = at;
                    self.push(TokenKind::InlineHtml, start);
                }
                self.pos = at + len;
                self.push(TokenKind::OpenTag, at);
                self.mode = Mode::Code;
                return;
            }
            scan = at + 2;
        }

        self.pos = self.input.len();
        self.push(TokenKind::InlineHtml, start);
    }

    /// Length of the open tag at `at`, including one trailing
    /// whitespace character after `<?php`.
    fn open_tag_len(&self, at: usize) -> Option<usize> {
        let rest = &self.input[at..];
        if rest.len() >= 5 && rest[2..5].eq_ignore_ascii_case(b"php") {
            return match rest.get(5) {
                None => Some(5),
                Some(b'\r') if rest.get(6) == Some(&b'\n') => Some(7),
                Some(b' ' | b'\t' | b'\n' | b'\r') => Some(6),
                Some(_) => None,
            };
        }
        if rest.get(2) == Some(&b'=') {
            return Some(3);
        }
        self.short_tags.then_some(2)
    }

    fn lex_code(&mut self) {
        let start = self.pos;
        let ch = self.input[self.pos];

        match ch {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => {
                while matches!(self.peek_at(0), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)) {
                    self.pos += 1;
                }
                self.push(TokenKind::Whitespace, start);
            }
            b'?' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                if self.starts_with(b"\r\n") {
                    self.pos += 2;
                } else if self.peek_at(0) == Some(b'\n') {
                    self.pos += 1;
                }
                self.push(TokenKind::CloseTag, start);
                self.mode = Mode::Html;
            }
            b'#' if self.peek_at(1) == Some(b'[') => {
                self.pos += 2;
                self.push(TokenKind::OpenAttribute, start);
            }
            b'#' => self.read_line_comment(start),
            b'/' if self.peek_at(1) == Some(b'/') => self.read_line_comment(start),
            b'/' if self.peek_at(1) == Some(b'*') => self.read_block_comment(start),
            b'$' if self.peek_at(1).is_some_and(is_ident_start) => {
                self.pos += 1;
                self.skip_ident();
                self.push(TokenKind::Variable, start);
            }
            b'\\' if self.peek_at(1).is_some_and(is_ident_start) => self.read_name(start),
            _ if is_ident_start(ch) => self.read_name(start),
            b'0'..=b'9' => self.read_number(start),
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.read_number(start),
            b'\'' => self.read_single_quoted(start),
            b'"' | b'`' => {
                let line = self.line;
                self.pos += 1;
                if !self.skip_interpolated(ch) {
                    self.report(LexErrorKind::UnterminatedString, line);
                }
                self.push(TokenKind::String, start);
            }
            b'<' if self.starts_with(b"<<<") && self.read_heredoc(start) => {}
            _ if ch.is_ascii_control() => {
                self.pos += 1;
                self.report(LexErrorKind::UnexpectedCharacter(char::from(ch)), self.line);
            }
            _ => self.read_punctuation(start, ch),
        }
    }

    fn read_punctuation(&mut self, start: usize, ch: u8) {
        let next = self.peek_at(1);
        let (kind, len) = match ch {
            b'{' => (TokenKind::OpenBrace, 1),
            b'}' => (TokenKind::CloseBrace, 1),
            b'(' => (TokenKind::OpenParen, 1),
            b')' => (TokenKind::CloseParen, 1),
            b'[' => (TokenKind::OpenBracket, 1),
            b']' => (TokenKind::CloseBracket, 1),
            b';' => (TokenKind::Semicolon, 1),
            b',' => (TokenKind::Comma, 1),
            b'=' if self.starts_with(b"===") => (TokenKind::Other, 3),
            b'=' if matches!(next, Some(b'=' | b'>')) => (TokenKind::Other, 2),
            b'=' => (TokenKind::Equals, 1),
            b'&' if matches!(next, Some(b'&' | b'=')) => (TokenKind::Other, 2),
            b'&' => (TokenKind::Ampersand, 1),
            b'.' if self.starts_with(b"...") => (TokenKind::Ellipsis, 3),
            b'?' if self.starts_with(b"?->") => (TokenKind::ObjectOperator, 3),
            b'?' if self.starts_with(b"??=") => (TokenKind::Other, 3),
            b'?' if next == Some(b'?') => (TokenKind::Other, 2),
            b'?' => (TokenKind::Question, 1),
            b'|' if matches!(next, Some(b'|' | b'=')) => (TokenKind::Other, 2),
            b'|' => (TokenKind::Pipe, 1),
            b':' if next == Some(b':') => (TokenKind::DoubleColon, 2),
            b':' => (TokenKind::Colon, 1),
            b'-' if next == Some(b'>') => (TokenKind::ObjectOperator, 2),
            _ => (TokenKind::Other, 1),
        };
        self.pos += len;
        self.push(kind, start);
    }

    fn skip_ident(&mut self) {
        while self.peek_at(0).is_some_and(is_ident_char) {
            self.pos += 1;
        }
    }

    fn read_name(&mut self, start: usize) {
        if self.input[self.pos] == b'\\' {
            self.pos += 1;
        }
        self.skip_ident();
        while self.peek_at(0) == Some(b'\\') {
            match self.peek_at(1) {
                Some(b) if is_ident_start(b) => {
                    self.pos += 1;
                    self.skip_ident();
                }
                // group use prefix: `Foo\{Bar, Baz}`
                Some(b'{') => {
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }

        let text = &self.src[start..self.pos];
        let after_member_access = matches!(
            self.last_significant,
            Some(TokenKind::ObjectOperator | TokenKind::DoubleColon)
        );
        let kind = if text.contains('\\') || after_member_access {
            TokenKind::Name
        } else {
            match TokenKind::keyword(text) {
                Some(TokenKind::Enum) if !self.enum_declaration_follows() => TokenKind::Name,
                Some(kind) => kind,
                None => TokenKind::Name,
            }
        };
        self.push(kind, start);
    }

    /// `enum` is only a keyword when whitespace and the declared name
    /// follow; `Enum` is otherwise an ordinary class name.
    fn enum_declaration_follows(&self) -> bool {
        let rest = &self.input[self.pos..];
        let Some(at) = rest
            .iter()
            .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .filter(|&at| at > 0 && is_ident_start(rest[at]))
        else {
            return false;
        };
        let len = rest[at..].iter().take_while(|&&b| is_ident_char(b)).count();
        let word = &rest[at..at + len];
        !word.eq_ignore_ascii_case(b"extends") && !word.eq_ignore_ascii_case(b"implements")
    }

    fn read_number(&mut self, start: usize) {
        while let Some(b) = self.peek_at(0) {
            let exponent_sign = matches!(b, b'+' | b'-')
                && matches!(self.input[self.pos - 1], b'e' | b'E')
                && !self.src[start..self.pos].starts_with("0x")
                && !self.src[start..self.pos].starts_with("0X");
            let fraction = b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit());
            if b.is_ascii_alphanumeric() || b == b'_' || fraction || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn read_line_comment(&mut self, start: usize) {
        while self.pos < self.input.len() {
            if self.input[self.pos] == b'\n' || self.starts_with(b"?>") {
                break;
            }
            self.pos += 1;
        }
        self.push(TokenKind::Comment, start);
    }

    fn read_block_comment(&mut self, start: usize) {
        let line = self.line;
        let doc = self.starts_with(b"/**")
            && matches!(self.peek_at(3), Some(b' ' | b'\t' | b'\n' | b'\r'));

        match find(&self.input[self.pos + 2..], b"*/") {
            Some(end) => self.pos += 2 + end + 2,
            None => {
                self.pos = self.input.len();
                self.report(LexErrorKind::UnterminatedComment, line);
            }
        }

        let kind = if doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.push(kind, start);
    }

    fn read_single_quoted(&mut self, start: usize) {
        let line = self.line;
        self.pos += 1;
        if !self.skip_single_quoted() {
            self.report(LexErrorKind::UnterminatedString, line);
        }
        self.push(TokenKind::String, start);
    }

    /// Advance past the closing `'`. Returns false at end of input.
    fn skip_single_quoted(&mut self) -> bool {
        while let Some(b) = self.peek_at(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.input.len()),
                b'\'' => {
                    self.pos += 1;
                    return true;
                }
                _ => self.pos += 1,
            }
        }
        false
    }

    /// Advance past the closing `quote`, stepping over `{$ ... }`
    /// interpolations that may themselves contain quotes.
    fn skip_interpolated(&mut self, quote: u8) -> bool {
        while let Some(b) = self.peek_at(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.input.len()),
                b'{' if self.peek_at(1) == Some(b'$') => {
                    self.pos += 1;
                    if !self.skip_interpolation() {
                        return false;
                    }
                }
                _ if b == quote => {
                    self.pos += 1;
                    return true;
                }
                _ => self.pos += 1,
            }
        }
        false
    }

    fn skip_interpolation(&mut self) -> bool {
        let mut depth = 1usize;
        while let Some(b) = self.peek_at(0) {
            match b {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    self.pos += 1;
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                b'\'' => {
                    self.pos += 1;
                    if !self.skip_single_quoted() {
                        return false;
                    }
                }
                b'"' => {
                    self.pos += 1;
                    if !self.skip_interpolated(b'"') {
                        return false;
                    }
                }
                _ => self.pos += 1,
            }
        }
        false
    }

    /// Heredoc (`<<<EOT`) or nowdoc (`<<<'EOT'`). Returns false, without
    /// consuming anything, when `<<<` does not introduce one.
    fn read_heredoc(&mut self, start: usize) -> bool {
        let line = self.line;
        let mut p = self.pos + 3;
        while matches!(self.input.get(p), Some(b' ' | b'\t')) {
            p += 1;
        }
        let quote = match self.input.get(p) {
            Some(&q @ (b'\'' | b'"')) => {
                p += 1;
                Some(q)
            }
            _ => None,
        };
        let marker_start = p;
        if !self.input.get(p).copied().is_some_and(is_ident_start) {
            return false;
        }
        while self.input.get(p).copied().is_some_and(is_ident_char) {
            p += 1;
        }
        let marker = &self.src[marker_start..p];
        if let Some(q) = quote {
            if self.input.get(p) != Some(&q) {
                return false;
            }
            p += 1;
        }
        if self.input.get(p) == Some(&b'\r') {
            p += 1;
        }
        if self.input.get(p) != Some(&b'\n') {
            return false;
        }
        p += 1;

        // The closing marker starts a line, optionally indented, and is
        // not followed by an identifier character.
        let mut line_start = p;
        loop {
            let mut q = line_start;
            while matches!(self.input.get(q), Some(b' ' | b'\t')) {
                q += 1;
            }
            if self.input[q..].starts_with(marker.as_bytes())
                && !self
                    .input
                    .get(q + marker.len())
                    .copied()
                    .is_some_and(is_ident_char)
            {
                self.pos = q + marker.len();
                break;
            }
            match find(&self.input[line_start..], b"\n") {
                Some(nl) => line_start += nl + 1,
                None => {
                    self.pos = self.input.len();
                    let marker = marker.to_string();
                    self.report(LexErrorKind::UnterminatedHeredoc { marker }, line);
                    break;
                }
            }
        }

        self.push(TokenKind::String, start);
        true
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
