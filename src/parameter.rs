use crate::context::{ClassScope, NameContext};
use crate::index::TokenIndex;
use crate::modifiers::{Modifiers, Visibility};
use crate::token::{Span, TokenKind};

/// One parameter of a method or function.
///
/// Built from the tokens of a single comma-separated group of a
/// parameter list. Tokens are classified positionally: attributes and
/// promotion modifiers, the type hint, `&` / `...` markers, the
/// variable, then everything after `=` as the default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterScanner {
    span: Span,
    line: usize,
    position: usize,
    name: String,
    type_hint: Option<String>,
    class: Option<String>,
    default_value: Option<String>,
    by_reference: bool,
    variadic: bool,
    promoted: Option<Visibility>,
}

impl ParameterScanner {
    /// Scan the parameter in `span`. Type hints resolve through
    /// `context`, with `scope` standing in for `self` and `parent`.
    #[must_use]
    pub fn new(
        index: &TokenIndex,
        span: Span,
        position: usize,
        context: &NameContext,
        scope: Option<&ClassScope>,
    ) -> Self {
        let mut modifiers = Modifiers::default();
        let mut type_span: Option<Span> = None;
        let mut name: Option<String> = None;
        let mut default_value = None;
        let mut by_reference = false;
        let mut variadic = false;

        let mut i = span.start;
        while i <= span.end {
            let Some(token) = index.get(i) else {
                break;
            };
            match token.kind {
                kind if kind.is_insignificant() => {}
                TokenKind::OpenAttribute => {
                    i = index.matching_close(i).unwrap_or(span.end);
                }
                TokenKind::Equals if name.is_some() => {
                    default_value = index
                        .next_significant(i + 1)
                        .filter(|&first| first <= span.end)
                        .map(|first| index.source_of(Span::new(first, span.end)).to_string());
                    break;
                }
                _ if name.is_some() => {}
                kind if type_span.is_none() && modifiers.apply(kind) => {}
                TokenKind::Ampersand if Self::marks_reference(index, i) => by_reference = true,
                TokenKind::Ellipsis => variadic = true,
                TokenKind::Variable => name = Some(token.text[1..].to_string()),
                _ => {
                    type_span = Some(match type_span {
                        Some(s) => Span::new(s.start, i),
                        None => Span::new(i, i),
                    });
                }
            }
            i += 1;
        }

        let type_hint = type_span.map(|s| index.source_of(s).to_string());
        let class = type_hint
            .as_deref()
            .and_then(|hint| context.resolve_type(hint, scope));

        Self {
            span,
            line: index.line(span.start),
            position,
            name: name.unwrap_or_default(),
            type_hint,
            class,
            default_value,
            by_reference,
            variadic,
            // `readonly` alone also promotes, as public
            promoted: modifiers
                .visibility
                .or_else(|| modifiers.is_readonly.then_some(Visibility::Public)),
        }
    }

    /// `&` is a by-reference marker only when it directly precedes the
    /// variable or `...`; otherwise it belongs to an intersection type.
    fn marks_reference(index: &TokenIndex, ampersand: usize) -> bool {
        index
            .next_significant(ampersand + 1)
            .and_then(|i| index.kind(i))
            .is_some_and(|k| matches!(k, TokenKind::Variable | TokenKind::Ellipsis))
    }

    /// Name without the `$` sigil.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based position in the parameter list.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Fully-qualified class named by the type hint, when the hint names
    /// exactly one class.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// The type hint as written.
    #[must_use]
    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    /// True iff a default value is present.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.default_value.is_some()
    }

    /// Default value expression exactly as written in the source.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    #[must_use]
    pub const fn is_passed_by_reference(&self) -> bool {
        self.by_reference
    }

    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Whether `null` is an acceptable argument: untyped, nullable,
    /// `mixed`, or defaulting to `null`.
    #[must_use]
    pub fn allows_null(&self) -> bool {
        let hint_allows = self.type_hint.as_deref().is_none_or(|hint| {
            hint.starts_with('?')
                || hint.eq_ignore_ascii_case("mixed")
                || hint
                    .split('|')
                    .any(|part| part.trim().eq_ignore_ascii_case("null"))
        });
        let null_default = self
            .default_value
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("null"));
        hint_allows || null_default
    }

    /// Visibility of a constructor-promoted parameter.
    #[must_use]
    pub const fn promoted(&self) -> Option<Visibility> {
        self.promoted
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }
}
