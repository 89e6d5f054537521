use std::sync::{Arc, OnceLock};

use crate::context::{ClassScope, NameContext};
use crate::index::TokenIndex;
use crate::method::MethodScanner;
use crate::modifiers::Modifiers;
use crate::property::{ConstantScanner, PropertyScanner};
use crate::token::{Span, TokenKind};
use crate::{DeclarationKind, Error};

/// Which keyword introduced the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub(crate) const fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Class => Some(Self::Class),
            TokenKind::Interface => Some(Self::Interface),
            TokenKind::Trait => Some(Self::Trait),
            TokenKind::Enum => Some(Self::Enum),
            _ => None,
        }
    }
}

/// A member declaration found in the class body, scanned on first use.
#[derive(Debug)]
struct Slot<T> {
    name: String,
    /// Whole declaration, modifiers included.
    decl: Span,
    /// The single declarator within `decl`.
    item: Span,
    scanner: OnceLock<T>,
}

impl<T> Slot<T> {
    const fn new(name: String, decl: Span, item: Span) -> Self {
        Self {
            name,
            decl,
            item,
            scanner: OnceLock::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Members {
    constants: Vec<Slot<ConstantScanner>>,
    properties: Vec<Slot<PropertyScanner>>,
    methods: Vec<Slot<MethodScanner>>,
    traits: Vec<String>,
}

/// A class, interface, trait, or enum declaration.
///
/// The header (modifiers, name, parent, interfaces) is read on
/// construction; the body is split into members on first access.
#[derive(Debug)]
pub struct ClassScanner {
    index: TokenIndex,
    span: Span,
    body: Span,
    context: Arc<NameContext>,
    scope: Arc<ClassScope>,
    short_name: String,
    kind: ClassKind,
    modifiers: Modifiers,
    interfaces: Vec<String>,
    members: OnceLock<Members>,
}

impl ClassScanner {
    /// `span` covers the declaration from its first modifier through the
    /// closing `}`; `keyword` is the index of `class`/`interface`/...
    #[must_use]
    pub fn new(index: TokenIndex, span: Span, keyword: usize, context: Arc<NameContext>) -> Self {
        let mut modifiers = Modifiers::default();
        for i in span.start..keyword {
            if let Some(kind) = index.kind(i) {
                modifiers.apply(kind);
            }
        }
        let kind = index
            .kind(keyword)
            .and_then(ClassKind::from_token)
            .unwrap_or(ClassKind::Class);

        let name_at = index.next_significant(keyword + 1).filter(|&i| i <= span.end);
        let short_name = name_at.map_or_else(String::new, |i| index.text(i).to_string());

        let open = name_at
            .and_then(|i| index.find_next(i, span.end, TokenKind::OpenBrace))
            .unwrap_or(span.end);
        let body = Span::new(open, span.end);

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut list = None;
        for i in name_at.map_or(open, |n| n + 1)..open {
            match index.kind(i) {
                Some(k @ (TokenKind::Extends | TokenKind::Implements)) => list = Some(k),
                // backed enum type
                Some(TokenKind::Colon) => list = None,
                Some(TokenKind::Name) => match list {
                    Some(TokenKind::Extends) => extends.push(context.resolve(index.text(i))),
                    Some(_) => implements.push(context.resolve(index.text(i))),
                    None => {}
                },
                _ => {}
            }
        }

        let (parent, interfaces) = if kind == ClassKind::Interface {
            (None, extends.into_iter().chain(implements).collect())
        } else {
            (extends.into_iter().next(), implements)
        };

        let scope = Arc::new(ClassScope {
            name: context.qualify(&short_name),
            parent,
        });

        Self {
            index,
            span,
            body,
            context,
            scope,
            short_name,
            kind,
            modifiers,
            interfaces,
            members: OnceLock::new(),
        }
    }

    /// Fully-qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.scope.name
    }

    /// Name as declared, without namespace.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.context.namespace()
    }

    /// Namespace and imports captured where the type was declared.
    #[must_use]
    pub fn context(&self) -> &NameContext {
        &self.context
    }

    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.modifiers.is_final
    }

    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.modifiers.is_readonly
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    #[must_use]
    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Fully-qualified parent class. Always `None` for interfaces, whose
    /// `extends` list is reported by [`Self::interfaces`].
    #[must_use]
    pub fn parent_class(&self) -> Option<&str> {
        self.scope.parent.as_deref()
    }

    /// Fully-qualified implemented (or, for interfaces, extended)
    /// interfaces in declaration order.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    #[must_use]
    pub fn line_start(&self) -> usize {
        self.index.line(self.span.start)
    }

    #[must_use]
    pub fn line_end(&self) -> usize {
        self.index.line(self.span.end)
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub fn doc_comment(&self) -> Option<&str> {
        self.index.doc_comment_before(self.span.start)
    }

    /// Fully-qualified names of traits pulled in with `use`.
    pub fn traits(&self) -> &[String] {
        &self.members().traits
    }

    /// Method names in declaration order.
    pub fn methods(&self) -> Vec<&str> {
        self.members().methods.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a method. Method names are case-insensitive in PHP; an
    /// exact match is preferred.
    pub fn method(&self, name: &str) -> Result<&MethodScanner, Error> {
        let methods = &self.members().methods;
        methods
            .iter()
            .find(|s| s.name == name)
            .or_else(|| methods.iter().find(|s| s.name.eq_ignore_ascii_case(name)))
            .map(|slot| {
                slot.scanner.get_or_init(|| {
                    MethodScanner::new(
                        self.index.clone(),
                        slot.decl,
                        Arc::clone(&self.context),
                        Some(Arc::clone(&self.scope)),
                        self.is_interface(),
                    )
                })
            })
            .ok_or_else(|| Error::not_found(DeclarationKind::Method, name))
    }

    /// Property names (without `$`) in declaration order.
    pub fn properties(&self) -> Vec<&str> {
        self.members()
            .properties
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Look up a property by name, with or without `$`.
    pub fn property(&self, name: &str) -> Result<&PropertyScanner, Error> {
        let name = name.strip_prefix('$').unwrap_or(name);
        self.members()
            .properties
            .iter()
            .find(|s| s.name == name)
            .map(|slot| {
                slot.scanner.get_or_init(|| {
                    PropertyScanner::new(
                        &self.index,
                        slot.decl,
                        slot.item,
                        &self.context,
                        Some(&*self.scope),
                    )
                })
            })
            .ok_or_else(|| Error::not_found(DeclarationKind::Property, name))
    }

    /// Constant names in declaration order.
    pub fn constants(&self) -> Vec<&str> {
        self.members()
            .constants
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn constant(&self, name: &str) -> Result<&ConstantScanner, Error> {
        self.members()
            .constants
            .iter()
            .find(|s| s.name == name)
            .map(|slot| {
                slot.scanner
                    .get_or_init(|| ConstantScanner::new(&self.index, slot.decl, slot.item))
            })
            .ok_or_else(|| Error::not_found(DeclarationKind::Constant, name))
    }

    fn members(&self) -> &Members {
        self.members.get_or_init(|| {
            let members = MemberSplitter::new(&self.index, &self.context, self.body).split();
            tracing::debug!(
                class = %self.scope.name,
                methods = members.methods.len(),
                properties = members.properties.len(),
                constants = members.constants.len(),
                "split class members"
            );
            members
        })
    }
}

/// Walks a class body at depth 1, jumping over every nested bracket
/// region, and records one slot per member declarator.
struct MemberSplitter<'a> {
    index: &'a TokenIndex,
    context: &'a NameContext,
    /// Exclusive bounds: the body's `{` and `}`.
    body: Span,
    members: Members,
}

impl<'a> MemberSplitter<'a> {
    fn new(index: &'a TokenIndex, context: &'a NameContext, body: Span) -> Self {
        Self {
            index,
            context,
            body,
            members: Members::default(),
        }
    }

    fn split(mut self) -> Members {
        let mut i = self.body.start + 1;
        let mut start: Option<usize> = None;

        while i < self.body.end {
            let Some(kind) = self.index.kind(i) else {
                break;
            };
            match kind {
                kind if kind.is_insignificant() => i += 1,
                TokenKind::OpenAttribute => i = self.skip_group(i),
                kind if kind.is_modifier() => {
                    start.get_or_insert(i);
                    i += 1;
                }
                TokenKind::Use if start.is_none() => i = self.trait_use(i),
                TokenKind::Const => {
                    i = self.constant(start.take().unwrap_or(i), i);
                }
                TokenKind::Function => {
                    i = self.method(start.take().unwrap_or(i), i);
                }
                TokenKind::Variable => {
                    i = self.property(start.take().unwrap_or(i), i);
                }
                TokenKind::Semicolon | TokenKind::CloseBrace => {
                    start = None;
                    i += 1;
                }
                TokenKind::OpenBrace | TokenKind::OpenParen | TokenKind::OpenBracket => {
                    i = self.skip_group(i);
                }
                // enum `case`, or anything unexpected: skip the statement
                TokenKind::Name if start.is_none() => {
                    i = self.statement_end(i) + 1;
                }
                // type tokens between modifiers and a property variable
                _ => i += 1,
            }
        }

        self.members
    }

    /// Index just past the bracket group opened at `open`.
    fn skip_group(&self, open: usize) -> usize {
        self.index
            .matching_close(open)
            .map_or(self.body.end, |close| close.min(self.body.end) + 1)
    }

    /// Terminating `;` of the statement starting at `from`, or the close
    /// of a `{ ... }` block (property hooks, trait adaptations).
    fn statement_end(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.body.end {
            match self.index.kind(i) {
                Some(TokenKind::Semicolon) | None => return i,
                Some(TokenKind::OpenBrace) => {
                    return self
                        .index
                        .matching_close(i)
                        .map_or(self.body.end - 1, |c| c.min(self.body.end - 1));
                }
                Some(TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenAttribute) => {
                    i = self.skip_group(i);
                }
                _ => i += 1,
            }
        }
        self.body.end - 1
    }

    fn trait_use(&mut self, at: usize) -> usize {
        let end = self.statement_end(at);
        for i in at + 1..end {
            match self.index.kind(i) {
                Some(TokenKind::Name) => {
                    let name = self.context.resolve(self.index.text(i));
                    self.members.traits.push(name);
                }
                Some(TokenKind::OpenBrace | TokenKind::Semicolon) => break,
                _ => {}
            }
        }
        end + 1
    }

    fn constant(&mut self, start: usize, keyword: usize) -> usize {
        let end = self.statement_end(keyword);
        let decl = Span::new(start, end);
        for item in self.index.split_top_level(Span::new(keyword, end)) {
            let eq = self.index.find_next(item.start, item.end, TokenKind::Equals);
            let name_at = eq.map_or(Some(item.end), |eq| self.index.prev_significant(eq));
            if let Some(name_at) = name_at.filter(|&n| n >= item.start) {
                let name = self.index.text(name_at).to_string();
                self.members.constants.push(Slot::new(name, decl, item));
            }
        }
        end + 1
    }

    fn method(&mut self, start: usize, keyword: usize) -> usize {
        let mut name_at = self.index.next_significant(keyword + 1);
        if name_at.and_then(|i| self.index.kind(i)) == Some(TokenKind::Ampersand) {
            name_at = name_at.and_then(|i| self.index.next_significant(i + 1));
        }
        let Some(name_at) = name_at.filter(|&i| i < self.body.end) else {
            return self.body.end;
        };

        let mut end = self.body.end - 1;
        let mut i = name_at + 1;
        while i < self.body.end {
            match self.index.kind(i) {
                Some(TokenKind::Semicolon) => {
                    end = i;
                    break;
                }
                Some(TokenKind::OpenBrace) => {
                    end = self.skip_group(i) - 1;
                    break;
                }
                Some(TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenAttribute) => {
                    i = self.skip_group(i);
                }
                _ => i += 1,
            }
        }

        let name = self.index.text(name_at).to_string();
        let span = Span::new(start, end);
        tracing::trace!(method = %name, ?span, "found method");
        self.members.methods.push(Slot::new(name, span, span));
        end + 1
    }

    fn property(&mut self, start: usize, first_var: usize) -> usize {
        let end = self.statement_end(first_var);
        let decl = Span::new(start, end);
        for item in self.index.split_top_level(Span::new(first_var - 1, end)) {
            if let Some(var) = self.index.find_next(item.start, item.end, TokenKind::Variable) {
                let name = self.index.text(var)[1..].to_string();
                self.members.properties.push(Slot::new(name, decl, item));
            }
        }
        end + 1
    }
}
