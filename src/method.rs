use std::sync::{Arc, OnceLock};

use crate::context::{ClassScope, NameContext};
use crate::index::TokenIndex;
use crate::modifiers::{Modifiers, Visibility};
use crate::parameter::ParameterScanner;
use crate::token::{Span, TokenKind};
use crate::{DeclarationKind, Error};

/// Selects a parameter by name (with or without `$`) or by zero-based
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey<'a> {
    Name(&'a str),
    Position(usize),
}

impl<'a> From<&'a str> for ParameterKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for ParameterKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ParameterKey<'_> {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

/// A method, or a top-level function, over its declaration span.
///
/// The header (modifiers, name, parameter-list and body spans) is read
/// on construction; parameters are scanned on first access.
#[derive(Debug)]
pub struct MethodScanner {
    index: TokenIndex,
    span: Span,
    context: Arc<NameContext>,
    scope: Option<Arc<ClassScope>>,
    name: String,
    modifiers: Modifiers,
    in_interface: bool,
    returns_reference: bool,
    parameter_list: Option<Span>,
    body: Option<Span>,
    return_type: Option<Span>,
    parameters: OnceLock<Vec<ParameterScanner>>,
}

impl MethodScanner {
    /// `span` runs from the first modifier (or `function`) through the
    /// closing `}` or `;`.
    #[must_use]
    pub fn new(
        index: TokenIndex,
        span: Span,
        context: Arc<NameContext>,
        scope: Option<Arc<ClassScope>>,
        in_interface: bool,
    ) -> Self {
        let mut modifiers = Modifiers::default();
        let mut cursor = span.start;
        while cursor <= span.end {
            match index.kind(cursor) {
                Some(TokenKind::Function) | None => break,
                Some(TokenKind::OpenAttribute) => {
                    cursor = index.matching_close_or_end(cursor);
                }
                Some(kind) => {
                    modifiers.apply(kind);
                }
            }
            cursor += 1;
        }

        let mut name_at = index.next_significant(cursor + 1).filter(|&i| i <= span.end);
        let returns_reference =
            name_at.is_some_and(|i| index.kind(i) == Some(TokenKind::Ampersand));
        if returns_reference {
            name_at = name_at
                .and_then(|i| index.next_significant(i + 1))
                .filter(|&i| i <= span.end);
        }
        let name = name_at.map_or_else(String::new, |i| index.text(i).to_string());

        let parameter_list = name_at
            .and_then(|i| index.find_next(i, span.end, TokenKind::OpenParen))
            .map(|open| {
                let close = index.matching_close(open).unwrap_or(span.end);
                Span::new(open, close.min(span.end))
            });

        let (return_type, body) = parameter_list.map_or((None, None), |params| {
            Self::scan_tail(&index, params.end + 1, span.end)
        });

        Self {
            index,
            span,
            context,
            scope,
            name,
            modifiers,
            in_interface,
            returns_reference,
            parameter_list,
            body,
            return_type,
            parameters: OnceLock::new(),
        }
    }

    /// Return type and body spans after the parameter list.
    fn scan_tail(index: &TokenIndex, from: usize, end: usize) -> (Option<Span>, Option<Span>) {
        let mut type_start = None;
        let mut type_end = None;
        let mut i = from;

        while i <= end {
            match index.kind(i) {
                Some(TokenKind::OpenBrace) => {
                    let close = index.matching_close(i).unwrap_or(end).min(end);
                    let return_type = type_start.zip(type_end).map(|(s, e)| Span::new(s, e));
                    return (return_type, Some(Span::new(i, close)));
                }
                Some(TokenKind::Semicolon) | None => break,
                Some(TokenKind::Colon) if type_start.is_none() => {
                    type_start = index.next_significant(i + 1).filter(|&s| s <= end);
                }
                Some(TokenKind::OpenParen) if type_start.is_some() => {
                    i = index.matching_close(i).unwrap_or(end);
                    type_end = Some(i);
                }
                Some(kind) if !kind.is_insignificant() && type_start.is_some() => {
                    type_end = Some(i);
                }
                _ => {}
            }
            i += 1;
        }

        (type_start.zip(type_end).map(|(s, e)| Span::new(s, e)), None)
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

    /// Declared `abstract`, or declared in an interface.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract || self.in_interface
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.modifiers.is_final
    }

    /// `function &name()`.
    #[must_use]
    pub const fn returns_reference(&self) -> bool {
        self.returns_reference
    }

    /// Line of the first modifier or `function` keyword.
    #[must_use]
    pub fn line_start(&self) -> usize {
        self.index.line(self.span.start)
    }

    /// Line of the closing `}`, or of the `;` for bodiless methods.
    #[must_use]
    pub fn line_end(&self) -> usize {
        self.index.line(self.span.end)
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Class declaring this method; `None` for top-level functions.
    #[must_use]
    pub fn declaring_class(&self) -> Option<&str> {
        self.scope.as_deref().map(|s| s.name.as_str())
    }

    /// Return type as written, without the leading `:`.
    #[must_use]
    pub fn return_type(&self) -> Option<&str> {
        self.return_type.map(|s| self.index.source_of(s))
    }

    #[must_use]
    pub fn doc_comment(&self) -> Option<&str> {
        self.index.doc_comment_before(self.span.start)
    }

    /// Source text between the body braces, braces excluded. Empty when
    /// the method has no body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body
            .map_or("", |b| self.index.source_between(b.start, b.end))
    }

    /// Whether the declaration has a `{ ... }` body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Parameter names in declaration order.
    #[must_use]
    pub fn parameters(&self) -> Vec<&str> {
        self.parameter_scanners()
            .iter()
            .map(ParameterScanner::name)
            .collect()
    }

    /// Parameter scanners in declaration order.
    pub fn parameter_scanners(&self) -> &[ParameterScanner] {
        self.parameters.get_or_init(|| self.scan_parameters())
    }

    /// Look up a parameter by name or position.
    pub fn parameter<'k>(
        &self,
        key: impl Into<ParameterKey<'k>>,
    ) -> Result<&ParameterScanner, Error> {
        let params = self.parameter_scanners();
        match key.into() {
            ParameterKey::Name(name) => {
                let name = name.strip_prefix('$').unwrap_or(name);
                params
                    .iter()
                    .find(|p| p.name() == name)
                    .ok_or_else(|| Error::not_found(DeclarationKind::Parameter, name))
            }
            ParameterKey::Position(position) => params
                .get(position)
                .ok_or_else(|| Error::not_found(DeclarationKind::Parameter, position.to_string())),
        }
    }

    fn scan_parameters(&self) -> Vec<ParameterScanner> {
        let Some(list) = self.parameter_list else {
            return Vec::new();
        };
        let params: Vec<_> = self
            .index
            .split_top_level(list)
            .into_iter()
            .enumerate()
            .map(|(position, piece)| {
                ParameterScanner::new(
                    &self.index,
                    piece,
                    position,
                    &self.context,
                    self.scope.as_deref(),
                )
            })
            .collect();
        tracing::trace!(method = %self.name, count = params.len(), "scanned parameters");
        params
    }
}
