use std::fmt;

use crate::token::TokenKind;

/// Member visibility. Members without a visibility keyword are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Modifier keywords collected ahead of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Explicit visibility keyword, if any. A repeated keyword
    /// overwrites the earlier one.
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

impl Modifiers {
    /// Record `kind` if it is a modifier keyword. Returns whether it was.
    pub const fn apply(&mut self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Public | TokenKind::Var => self.visibility = Some(Visibility::Public),
            TokenKind::Protected => self.visibility = Some(Visibility::Protected),
            TokenKind::Private => self.visibility = Some(Visibility::Private),
            TokenKind::Static => self.is_static = true,
            TokenKind::Abstract => self.is_abstract = true,
            TokenKind::Final => self.is_final = true,
            TokenKind::Readonly => self.is_readonly = true,
            _ => return false,
        }
        true
    }

    /// Effective visibility, defaulting to public.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }
}
