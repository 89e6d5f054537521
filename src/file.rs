use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::class::ClassScanner;
use crate::context::NameContext;
use crate::index::TokenIndex;
use crate::lexer::{self, LexError};
use crate::method::MethodScanner;
use crate::options::ScanOptions;
use crate::token::{Span, Token, TokenKind};
use crate::{DeclarationKind, Error};

/// A top-level declaration, scanned in depth on first use.
#[derive(Debug)]
struct Declared<T> {
    name: String,
    keyword: usize,
    span: Span,
    context: Arc<NameContext>,
    scanner: OnceLock<T>,
}

/// Root of a scanned file: namespaces, imports, and the top-level
/// classes and functions declared in one source text.
///
/// Owns the shared token index; every derived scanner is cached here
/// (or on a descendant) and lives as long as this value.
#[derive(Debug)]
pub struct FileScanner {
    index: TokenIndex,
    diagnostics: Vec<LexError>,
    namespaces: Vec<String>,
    namespace: Option<String>,
    uses: BTreeMap<String, String>,
    classes: Vec<Declared<ClassScanner>>,
    functions: Vec<Declared<MethodScanner>>,
}

impl FileScanner {
    /// Scan `source` with default options.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self::with_options(source, &ScanOptions::new())
    }

    #[must_use]
    pub fn with_options(source: &str, options: &ScanOptions) -> Self {
        let lexed = lexer::tokenize_with_options(source, options);
        let index = TokenIndex::new(lexer::strip_bom(source), lexed.tokens);
        let file = Walker::new(index, lexed.diagnostics).walk();
        tracing::debug!(
            namespace = ?file.namespace,
            classes = file.classes.len(),
            functions = file.functions.len(),
            diagnostics = file.diagnostics.len(),
            "scanned file"
        );
        file
    }

    /// Scan `source`, failing on the first lexical diagnostic.
    pub fn scan_strict(source: &str) -> Result<Self, Error> {
        let file = Self::new(source);
        if let Some(err) = file.diagnostics.first() {
            return Err(Error::MalformedSource(err.clone()));
        }
        Ok(file)
    }

    /// Namespace in effect at the end of the file.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Every named namespace declaration, in source order.
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// All imports in the file, short name to fully-qualified name. A
    /// later import of the same short name replaces an earlier one.
    #[must_use]
    pub const fn uses(&self) -> &BTreeMap<String, String> {
        &self.uses
    }

    /// Fully-qualified names of the declared types, in source order.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.classes.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a declared type. A name without `\` is tried against the
    /// namespace in effect at end of file, then against every declared
    /// namespace in source order, then as given.
    pub fn class(&self, name: &str) -> Result<&ClassScanner, Error> {
        let wanted = name.strip_prefix('\\').unwrap_or(name);
        let found = self.lookup_in_namespace(&self.classes, wanted)
            .ok_or_else(|| Error::not_found(DeclarationKind::Class, name))?;
        Ok(found.scanner.get_or_init(|| {
            ClassScanner::new(
                self.index.clone(),
                found.span,
                found.keyword,
                Arc::clone(&found.context),
            )
        }))
    }

    /// Fully-qualified names of top-level functions, in source order.
    #[must_use]
    pub fn functions(&self) -> Vec<&str> {
        self.functions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a top-level function, resolved like [`Self::class`].
    pub fn function(&self, name: &str) -> Result<&MethodScanner, Error> {
        let wanted = name.strip_prefix('\\').unwrap_or(name);
        let found = self.lookup_in_namespace(&self.functions, wanted)
            .ok_or_else(|| Error::not_found(DeclarationKind::Function, name))?;
        Ok(found.scanner.get_or_init(|| {
            MethodScanner::new(
                self.index.clone(),
                found.span,
                Arc::clone(&found.context),
                None,
                false,
            )
        }))
    }

    /// Soft lexical problems met while tokenizing.
    #[must_use]
    pub fn diagnostics(&self) -> &[LexError] {
        &self.diagnostics
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        self.index.tokens()
    }

    /// A bare name is qualified with the end-of-file namespace, then
    /// with each declared namespace in source order, then tried as given.
    fn lookup_in_namespace<'a, T>(
        &self,
        declared: &'a [Declared<T>],
        wanted: &str,
    ) -> Option<&'a Declared<T>> {
        let scoped = if wanted.contains('\\') {
            None
        } else {
            self.namespace
                .iter()
                .chain(&self.namespaces)
                .find_map(|ns| Self::lookup(declared, &format!("{ns}\\{wanted}")))
        };
        scoped.or_else(|| Self::lookup(declared, wanted))
    }

    /// Exact match first; PHP class and function names are otherwise
    /// case-insensitive.
    fn lookup<'a, T>(declared: &'a [Declared<T>], name: &str) -> Option<&'a Declared<T>> {
        declared
            .iter()
            .find(|d| d.name == name)
            .or_else(|| declared.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
    }
}

/// The single left-to-right pass that discovers namespaces, imports,
/// and top-level declarations.
struct Walker {
    index: TokenIndex,
    diagnostics: Vec<LexError>,
    namespaces: Vec<String>,
    namespace: Option<String>,
    imports: BTreeMap<String, String>,
    uses: BTreeMap<String, String>,
    snapshot: Option<Arc<NameContext>>,
    classes: Vec<Declared<ClassScanner>>,
    functions: Vec<Declared<MethodScanner>>,
}

impl Walker {
    fn new(index: TokenIndex, diagnostics: Vec<LexError>) -> Self {
        Self {
            index,
            diagnostics,
            namespaces: Vec::new(),
            namespace: None,
            imports: BTreeMap::new(),
            uses: BTreeMap::new(),
            snapshot: None,
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }

    fn walk(mut self) -> FileScanner {
        let mut i = 0;
        let mut modifiers_start: Option<usize> = None;

        while let Some(at) = self.index.next_significant(i) {
            let kind = self.index.kind(at).unwrap_or(TokenKind::Other);
            i = match kind {
                TokenKind::Abstract | TokenKind::Final | TokenKind::Readonly => {
                    modifiers_start.get_or_insert(at);
                    i = at + 1;
                    continue;
                }
                TokenKind::Namespace => self.namespace_decl(at),
                TokenKind::Use => self.use_decl(at),
                TokenKind::Class | TokenKind::Interface | TokenKind::Trait | TokenKind::Enum => {
                    self.type_decl(modifiers_start.unwrap_or(at), at)
                }
                TokenKind::Function => self.function_decl(at),
                _ => at + 1,
            };
            modifiers_start = None;
        }

        FileScanner {
            index: self.index,
            diagnostics: self.diagnostics,
            namespaces: self.namespaces,
            namespace: self.namespace,
            uses: self.uses,
            classes: self.classes,
            functions: self.functions,
        }
    }

    /// Shared snapshot of the current namespace and imports.
    fn context(&mut self) -> Arc<NameContext> {
        let (namespace, imports) = (&self.namespace, &self.imports);
        Arc::clone(self.snapshot.get_or_insert_with(|| {
            Arc::new(NameContext::new(namespace.clone(), imports.clone()))
        }))
    }

    fn significant_kind(&self, from: usize) -> Option<(usize, TokenKind)> {
        let at = self.index.next_significant(from)?;
        Some((at, self.index.kind(at)?))
    }

    /// `namespace Foo;`, `namespace Foo { ... }` or `namespace { ... }`.
    /// The block itself is walked like top-level code.
    fn namespace_decl(&mut self, at: usize) -> usize {
        let next = match self.significant_kind(at + 1) {
            Some((n, TokenKind::Name)) => {
                let name = self.index.text(n).trim_start_matches('\\').to_string();
                tracing::trace!(namespace = %name, line = self.index.line(at), "namespace");
                self.namespaces.push(name.clone());
                self.namespace = Some(name);
                n + 1
            }
            Some((_, TokenKind::OpenBrace | TokenKind::Semicolon)) => {
                self.namespace = None;
                at + 1
            }
            // `namespace\foo()` relative name or garbage
            _ => return at + 1,
        };
        self.imports.clear();
        self.snapshot = None;
        next
    }

    /// `use A\B;`, `use A\B as C, D;`, `use A\{B, C as D};`.
    /// `use function` and `use const` do not name classes.
    fn use_decl(&mut self, at: usize) -> usize {
        match self.significant_kind(at + 1) {
            Some((_, TokenKind::Function | TokenKind::Const)) => {
                return self.statement_end(at) + 1;
            }
            // closure `use ($x)`
            Some((_, TokenKind::OpenParen)) => return at + 1,
            _ => {}
        }

        let end = self.statement_end(at);
        let mut prefix = String::new();
        let mut name: Option<String> = None;
        let mut alias: Option<String> = None;
        let mut expect_alias = false;
        // `function`/`const` members of a group use name no class
        let mut skip_item = false;

        for i in at + 1..=end {
            let Some(token) = self.index.get(i) else {
                break;
            };
            match token.kind {
                kind if kind.is_insignificant() => {}
                TokenKind::Comma | TokenKind::CloseBrace | TokenKind::Semicolon => {
                    if skip_item {
                        name = None;
                        alias = None;
                    }
                    self.bind_import(name.take(), alias.take());
                    expect_alias = false;
                    skip_item = false;
                }
                TokenKind::OpenBrace => {}
                TokenKind::Function | TokenKind::Const => skip_item = true,
                _ if expect_alias => {
                    alias = Some(token.text.clone());
                    expect_alias = false;
                }
                TokenKind::Name if token.text.eq_ignore_ascii_case("as") && name.is_some() => {
                    expect_alias = true;
                }
                TokenKind::Name if token.text.ends_with('\\') => {
                    prefix = token.text.trim_start_matches('\\').to_string();
                }
                TokenKind::Name => {
                    name = Some(format!("{prefix}{}", token.text.trim_start_matches('\\')));
                }
                _ => {}
            }
        }
        if !skip_item {
            self.bind_import(name, alias);
        }
        end + 1
    }

    fn bind_import(&mut self, name: Option<String>, alias: Option<String>) {
        let Some(name) = name else { return };
        let alias = alias.unwrap_or_else(|| name.rsplit('\\').next().unwrap_or(&name).to_string());
        tracing::trace!(%alias, %name, "import");
        self.imports.insert(alias.clone(), name.clone());
        self.uses.insert(alias, name);
        self.snapshot = None;
    }

    fn type_decl(&mut self, start: usize, keyword: usize) -> usize {
        let anonymous = self
            .index
            .prev_significant(keyword)
            .and_then(|p| self.index.kind(p))
            == Some(TokenKind::New);

        let name_at = match self.significant_kind(keyword + 1) {
            Some((n, TokenKind::Name)) if !anonymous => n,
            // `enum` used as an ordinary identifier
            _ if self.index.kind(keyword) == Some(TokenKind::Enum) => return keyword + 1,
            _ => return self.skip_anonymous(keyword),
        };

        let Some(open) = self.header_end(name_at + 1) else {
            tracing::debug!(
                line = self.index.line(keyword),
                name = self.index.text(name_at),
                "type declaration without body, skipped"
            );
            return name_at + 1;
        };
        let close = self.index.matching_close_or_end(open);

        let context = self.context();
        let name = context.qualify(self.index.text(name_at));
        tracing::trace!(
            %name,
            keyword = self.index.text(keyword),
            line = self.index.line(keyword),
            "found type"
        );
        self.classes.push(Declared {
            name,
            keyword,
            span: Span::new(start, close),
            context,
            scanner: OnceLock::new(),
        });
        close + 1
    }

    /// `{` opening a type body, provided only header tokens precede it.
    fn header_end(&self, from: usize) -> Option<usize> {
        let mut i = from;
        loop {
            let (at, kind) = self.significant_kind(i)?;
            match kind {
                TokenKind::OpenBrace => return Some(at),
                TokenKind::Name
                | TokenKind::Extends
                | TokenKind::Implements
                | TokenKind::Comma
                | TokenKind::Colon => i = at + 1,
                _ => return None,
            }
        }
    }

    /// Step over an anonymous class (`new class(...) extends X { ... }`)
    /// so its members are not read as top-level code.
    fn skip_anonymous(&self, keyword: usize) -> usize {
        let mut i = keyword + 1;
        while let Some((at, kind)) = self.significant_kind(i) {
            match kind {
                TokenKind::OpenParen => i = self.index.matching_close_or_end(at) + 1,
                TokenKind::OpenBrace => return self.index.matching_close_or_end(at) + 1,
                TokenKind::Semicolon => return at + 1,
                _ => i = at + 1,
            }
        }
        i
    }

    /// Named top-level function. Closures are walked as ordinary code.
    fn function_decl(&mut self, at: usize) -> usize {
        let mut next = self.significant_kind(at + 1);
        if let Some((amp, TokenKind::Ampersand)) = next {
            next = self.significant_kind(amp + 1);
        }
        let Some((name_at, TokenKind::Name)) = next else {
            return at + 1;
        };
        let Some((open, TokenKind::OpenParen)) = self.significant_kind(name_at + 1) else {
            return at + 1;
        };

        let mut i = self.index.matching_close_or_end(open) + 1;
        let end = loop {
            match self.significant_kind(i) {
                Some((brace, TokenKind::OpenBrace)) => {
                    break self.index.matching_close_or_end(brace);
                }
                Some((semi, TokenKind::Semicolon)) => break semi,
                Some((paren, TokenKind::OpenParen)) => {
                    i = self.index.matching_close_or_end(paren) + 1;
                }
                Some((other, _)) => i = other + 1,
                None => break self.index.len().saturating_sub(1),
            }
        };

        let context = self.context();
        let name = context.qualify(self.index.text(name_at));
        tracing::trace!(%name, line = self.index.line(at), "found function");
        self.functions.push(Declared {
            name,
            keyword: at,
            span: Span::new(at, end),
            context,
            scanner: OnceLock::new(),
        });
        end + 1
    }

    /// Terminating `;` of the statement starting at `from`, or the last
    /// token when the file ends first.
    fn statement_end(&self, from: usize) -> usize {
        self.index
            .find_next(from, self.index.len(), TokenKind::Semicolon)
            .unwrap_or_else(|| self.index.len().saturating_sub(1))
    }
}
