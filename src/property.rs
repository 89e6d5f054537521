use crate::context::{ClassScope, NameContext};
use crate::index::TokenIndex;
use crate::modifiers::{Modifiers, Visibility};
use crate::token::{Span, TokenKind};

/// One declarator of a property declaration.
///
/// `public static ?int $a = 1, $b;` yields two scanners that share the
/// modifiers and type of the declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyScanner {
    name: String,
    modifiers: Modifiers,
    type_hint: Option<String>,
    class: Option<String>,
    default_value: Option<String>,
    line: usize,
    doc_comment: Option<String>,
}

impl PropertyScanner {
    /// `decl` covers the whole declaration, `item` the declarator.
    #[must_use]
    pub fn new(
        index: &TokenIndex,
        decl: Span,
        item: Span,
        context: &NameContext,
        scope: Option<&ClassScope>,
    ) -> Self {
        let mut modifiers = Modifiers::default();
        let mut type_span: Option<Span> = None;

        for i in decl.start..=decl.end {
            match index.kind(i) {
                None | Some(TokenKind::Variable) => break,
                Some(kind) if kind.is_insignificant() => {}
                Some(kind) if modifiers.apply(kind) => {}
                Some(_) => {
                    type_span = Some(type_span.map_or(Span::new(i, i), |s| Span::new(s.start, i)));
                }
            }
        }

        let name_at = index.find_next(item.start, item.end, TokenKind::Variable);
        let name = name_at.map_or_else(String::new, |i| index.text(i)[1..].to_string());
        let default_value = name_at
            .and_then(|i| index.find_next(i, item.end, TokenKind::Equals))
            .and_then(|eq| index.next_significant(eq + 1))
            .filter(|&first| first <= item.end)
            .map(|first| index.source_of(Span::new(first, value_end(index, first, item.end))))
            .map(str::to_string);

        let type_hint = type_span.map(|s| index.source_of(s).to_string());
        let class = type_hint
            .as_deref()
            .and_then(|hint| context.resolve_type(hint, scope));

        Self {
            name,
            modifiers,
            type_hint,
            class,
            default_value,
            line: index.line(name_at.unwrap_or(item.start)),
            doc_comment: index.doc_comment_before(decl.start).map(str::to_string),
        }
    }

    /// Name without the `$` sigil.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.modifiers.visibility()
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility() == Visibility::Public
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.visibility() == Visibility::Protected
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility() == Visibility::Private
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.modifiers.is_readonly
    }

    #[must_use]
    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    /// Fully-qualified class named by the type hint.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Default value exactly as written.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Line of the property's variable.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }
}

/// One constant of a `const` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantScanner {
    name: String,
    modifiers: Modifiers,
    value: Option<String>,
    line: usize,
    doc_comment: Option<String>,
}

impl ConstantScanner {
    /// `decl` covers the whole declaration, `item` one `NAME = value`.
    #[must_use]
    pub fn new(index: &TokenIndex, decl: Span, item: Span) -> Self {
        let mut modifiers = Modifiers::default();
        for i in decl.start..=decl.end {
            match index.kind(i) {
                None | Some(TokenKind::Const) => break,
                Some(kind) => {
                    modifiers.apply(kind);
                }
            }
        }

        let eq = index.find_next(item.start, item.end, TokenKind::Equals);
        let name_at = match eq {
            Some(eq) => index.prev_significant(eq).filter(|&i| i >= item.start),
            None => Some(item.end),
        };
        let value = eq
            .and_then(|eq| index.next_significant(eq + 1))
            .filter(|&first| first <= item.end)
            .map(|first| index.source_of(Span::new(first, item.end)).to_string());

        Self {
            name: name_at.map_or_else(String::new, |i| index.text(i).to_string()),
            modifiers,
            value,
            line: index.line(name_at.unwrap_or(item.start)),
            doc_comment: index.doc_comment_before(decl.start).map(str::to_string),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.modifiers.visibility()
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.modifiers.is_final
    }

    /// Value expression exactly as written.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }
}

/// Last significant token of a default value, stopping before a
/// property hook block.
fn value_end(index: &TokenIndex, first: usize, end: usize) -> usize {
    let mut i = first;
    let mut last = first;
    while i <= end {
        match index.kind(i) {
            Some(TokenKind::OpenBrace) if i > first => break,
            Some(TokenKind::OpenParen | TokenKind::OpenBracket) => {
                last = index.matching_close(i).unwrap_or(end).min(end);
                i = last;
            }
            Some(kind) if !kind.is_insignificant() => last = i,
            _ => {}
        }
        i += 1;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn index(source: &str) -> TokenIndex {
        TokenIndex::new(source, tokenize(source))
    }

    fn at(idx: &TokenIndex, text: &str) -> usize {
        idx.tokens()
            .iter()
            .position(|t| t.text == text)
            .expect("token present")
    }

    #[test]
    fn property_with_type_and_default() {
        let idx = index("<?php\n/** Count. */\nprotected static ?int $count = 0;");
        let decl = Span::new(at(&idx, "protected"), at(&idx, ";"));
        let item = Span::new(at(&idx, "$count"), at(&idx, "0"));
        let p = PropertyScanner::new(&idx, decl, item, &NameContext::default(), None);
        assert_eq!(p.name(), "count");
        assert!(p.is_protected());
        assert!(p.is_static());
        assert_eq!(p.type_hint(), Some("?int"));
        assert_eq!(p.class(), None);
        assert_eq!(p.default_value(), Some("0"));
        assert_eq!(p.line(), 3);
        assert_eq!(p.doc_comment(), Some("/** Count. */"));
    }

    #[test]
    fn property_class_type() {
        let idx = index("<?php private readonly Clock $clock;");
        let decl = Span::new(at(&idx, "private"), at(&idx, ";"));
        let item = Span::new(at(&idx, "$clock"), at(&idx, "$clock"));
        let ctx = NameContext::new(Some("App".to_string()), Default::default());
        let p = PropertyScanner::new(&idx, decl, item, &ctx, None);
        assert!(p.is_private());
        assert!(p.is_readonly());
        assert_eq!(p.class(), Some("App\\Clock"));
        assert_eq!(p.default_value(), None);
    }

    #[test]
    fn constant_value() {
        let idx = index("<?php final public const int LIMIT = 10 * 2;");
        let decl = Span::new(at(&idx, "final"), at(&idx, ";"));
        let item = Span::new(at(&idx, "int"), at(&idx, "2"));
        let c = ConstantScanner::new(&idx, decl, item);
        assert_eq!(c.name(), "LIMIT");
        assert_eq!(c.value(), Some("10 * 2"));
        assert!(c.is_final());
        assert_eq!(c.visibility(), Visibility::Public);
    }
}
