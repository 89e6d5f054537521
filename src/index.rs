use std::sync::Arc;

use crate::token::{Span, Token, TokenKind};

/// Read-only, cheaply clonable view over one file's tokens and source.
///
/// Every scanner in a file's tree holds a clone of the same index and
/// refers to tokens by [`Span`], never by copy.
#[derive(Debug, Clone)]
pub struct TokenIndex {
    source: Arc<str>,
    tokens: Arc<[Token]>,
}

impl TokenIndex {
    /// `source` must be the exact text the tokens were lexed from.
    #[must_use]
    pub fn new(source: &str, tokens: Vec<Token>) -> Self {
        Self {
            source: Arc::from(source),
            tokens: Arc::from(tokens),
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of the token at `index`, if any.
    #[must_use]
    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Verbatim text of the token at `index`, or `""` past the end.
    #[must_use]
    pub fn text(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| t.text.as_str())
    }

    /// 1-based line of the token at `index`; past the end, the line of
    /// the last token.
    #[must_use]
    pub fn line(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// First token at or after `from` that is not whitespace, a comment,
    /// or outside PHP mode.
    #[must_use]
    pub fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_insignificant())
    }

    /// Last significant token strictly before `before`.
    #[must_use]
    pub fn prev_significant(&self, before: usize) -> Option<usize> {
        (0..before.min(self.tokens.len()))
            .rev()
            .find(|&i| !self.tokens[i].kind.is_insignificant())
    }

    /// First token of `kind` in `from..=end`.
    #[must_use]
    pub fn find_next(&self, from: usize, end: usize, kind: TokenKind) -> Option<usize> {
        let end = end.min(self.tokens.len().saturating_sub(1));
        (from..=end).find(|&i| self.tokens[i].kind == kind)
    }

    /// Index of the delimiter closing the one at `open`, counting only
    /// the same delimiter pair. `None` when `open` is not an opening
    /// delimiter or the input ends first.
    #[must_use]
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let opener = self.kind(open)?;
        let closer = closing_for(opener)?;
        let mut depth = 0usize;

        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind == opener
                || (closer == TokenKind::CloseBracket && token.kind == TokenKind::OpenBracket)
                || (closer == TokenKind::CloseBracket && token.kind == TokenKind::OpenAttribute)
            {
                depth += 1;
            } else if token.kind == closer {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// Like [`Self::matching_close`], but falls back to the last token
    /// so a truncated file still yields a span.
    #[must_use]
    pub fn matching_close_or_end(&self, open: usize) -> usize {
        self.matching_close(open)
            .unwrap_or_else(|| self.tokens.len().saturating_sub(1))
    }

    /// Split the tokens strictly inside `span` on commas that are not
    /// nested in any bracket pair. Each piece is returned as the range
    /// of its significant tokens; pieces with none are dropped.
    #[must_use]
    pub fn split_top_level(&self, span: Span) -> Vec<Span> {
        let mut pieces = Vec::new();
        let mut depth = 0usize;
        let mut piece_start = span.start + 1;

        for i in span.start + 1..span.end {
            match self.tokens[i].kind {
                TokenKind::OpenBrace
                | TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenAttribute => depth += 1,
                TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::CloseBracket => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Comma if depth == 0 => {
                    pieces.extend(self.trim(piece_start, i));
                    piece_start = i + 1;
                }
                _ => {}
            }
        }
        pieces.extend(self.trim(piece_start, span.end));
        pieces
    }

    /// Significant tokens of `from..to` as a span.
    fn trim(&self, from: usize, to: usize) -> Option<Span> {
        let first = self.next_significant(from).filter(|&i| i < to)?;
        let last = self.prev_significant(to).filter(|&i| i >= first)?;
        Some(Span::new(first, last))
    }

    /// Verbatim source text of every token in `span`.
    #[must_use]
    pub fn source_of(&self, span: Span) -> &str {
        let (Some(first), Some(last)) = (self.tokens.get(span.start), self.tokens.get(span.end))
        else {
            return "";
        };
        &self.source[first.offset..last.end_offset()]
    }

    /// Verbatim source text strictly between two tokens.
    #[must_use]
    pub fn source_between(&self, open: usize, close: usize) -> &str {
        match (self.tokens.get(open), self.tokens.get(close)) {
            (Some(a), Some(b)) if a.end_offset() <= b.offset => {
                &self.source[a.end_offset()..b.offset]
            }
            _ => "",
        }
    }

    /// Nearest doc comment before `index`, skipping only whitespace,
    /// plain comments, and attributes.
    #[must_use]
    pub fn doc_comment_before(&self, index: usize) -> Option<&str> {
        let mut i = index;
        while i > 0 {
            i -= 1;
            match self.tokens[i].kind {
                TokenKind::DocComment => return Some(&self.tokens[i].text),
                TokenKind::Whitespace | TokenKind::Comment => {}
                TokenKind::CloseBracket => {
                    i = self.attribute_start(i)?;
                }
                _ => return None,
            }
        }
        None
    }

    /// Opening `#[` of the attribute whose `]` is at `close`.
    fn attribute_start(&self, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for i in (0..=close).rev() {
            match self.tokens[i].kind {
                TokenKind::CloseBracket => depth += 1,
                TokenKind::OpenBracket | TokenKind::OpenAttribute => {
                    depth -= 1;
                    if depth == 0 {
                        return (self.tokens[i].kind == TokenKind::OpenAttribute).then_some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

const fn closing_for(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::OpenBrace => Some(TokenKind::CloseBrace),
        TokenKind::OpenParen => Some(TokenKind::CloseParen),
        TokenKind::OpenBracket | TokenKind::OpenAttribute => Some(TokenKind::CloseBracket),
        _ => None,
    }
}
