use std::collections::BTreeMap;

/// Type hints that never name a class.
const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "string", "true", "void",
];

/// Namespace and imports in effect at a declaration.
///
/// Captured once by the file scan at the point of each declaration and
/// shared, unmodified, by every scanner derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameContext {
    namespace: Option<String>,
    imports: BTreeMap<String, String>,
}

/// The class a member belongs to, for `self`, `static`, and `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassScope {
    pub name: String,
    pub parent: Option<String>,
}

impl NameContext {
    #[must_use]
    pub const fn new(namespace: Option<String>, imports: BTreeMap<String, String>) -> Self {
        Self { namespace, imports }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Short name (alias) to fully-qualified name.
    #[must_use]
    pub const fn imports(&self) -> &BTreeMap<String, String> {
        &self.imports
    }

    /// Fully-qualified name bound to `alias`. Aliases compare
    /// case-insensitively, as PHP class names do.
    #[must_use]
    pub fn import(&self, alias: &str) -> Option<&str> {
        self.imports.get(alias).map(String::as_str).or_else(|| {
            self.imports
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(alias))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Prefix `name` with the active namespace.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Resolve a class reference written in source to its
    /// fully-qualified name (without leading `\`).
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        if let Some(fq) = name.strip_prefix('\\') {
            return fq.to_string();
        }
        if let Some(imported) = self.resolve_import(name) {
            return imported;
        }
        match name.split_once('\\') {
            Some((head, rest)) if head.eq_ignore_ascii_case("namespace") => self.qualify(rest),
            _ => self.qualify(name),
        }
    }

    /// Substitute the first segment of `name` when it is an import alias.
    fn resolve_import(&self, name: &str) -> Option<String> {
        let (head, rest) = match name.split_once('\\') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        let bound = self.import(head)?;
        Some(match rest {
            Some(rest) => format!("{bound}\\{rest}"),
            None => bound.to_string(),
        })
    }

    /// Class named by a type hint, if the hint names exactly one class.
    ///
    /// Nullable (`?T`, `T|null`) hints resolve to `T`; other unions,
    /// intersections, and builtin types yield `None`. An import alias
    /// wins over a builtin of the same spelling.
    #[must_use]
    pub fn resolve_type(&self, hint: &str, scope: Option<&ClassScope>) -> Option<String> {
        let hint = hint.trim();
        let hint = hint.strip_prefix('?').unwrap_or(hint).trim();
        if hint.is_empty() || hint.contains(['&', '(', ')']) {
            return None;
        }

        let members: Vec<&str> = hint
            .split('|')
            .map(str::trim)
            .filter(|m| !m.eq_ignore_ascii_case("null"))
            .collect();
        let [single] = members.as_slice() else {
            return None;
        };

        if let Some(fq) = single.strip_prefix('\\') {
            return Some(fq.to_string());
        }
        if let Some(imported) = self.resolve_import(single) {
            return Some(imported);
        }

        let lower = single.to_ascii_lowercase();
        match lower.as_str() {
            "self" | "static" => scope.map(|s| s.name.clone()),
            "parent" => scope.and_then(|s| s.parent.clone()),
            _ if BUILTIN_TYPES.contains(&lower.as_str()) => None,
            _ => Some(self.resolve(single)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> NameContext {
        let mut imports = BTreeMap::new();
        imports.insert("Foo".to_string(), "Vendor\\Lib\\Foo".to_string());
        imports.insert("Alias".to_string(), "Vendor\\Other\\Thing".to_string());
        imports.insert("Sub".to_string(), "Vendor\\Sub".to_string());
        NameContext::new(Some("App\\Model".to_string()), imports)
    }

    #[test]
    fn resolve_variants() {
        let ctx = context();
        assert_eq!(ctx.resolve("\\Global\\Thing"), "Global\\Thing");
        assert_eq!(ctx.resolve("Foo"), "Vendor\\Lib\\Foo");
        assert_eq!(ctx.resolve("foo"), "Vendor\\Lib\\Foo");
        assert_eq!(ctx.resolve("Alias"), "Vendor\\Other\\Thing");
        assert_eq!(ctx.resolve("Sub\\Deep"), "Vendor\\Sub\\Deep");
        assert_eq!(ctx.resolve("Local"), "App\\Model\\Local");
        assert_eq!(ctx.resolve("namespace\\Local"), "App\\Model\\Local");
    }

    #[test]
    fn resolve_without_namespace() {
        let ctx = NameContext::default();
        assert_eq!(ctx.resolve("Local"), "Local");
        assert_eq!(ctx.namespace(), None);
    }

    #[test]
    fn resolve_type_hints() {
        let ctx = context();
        let scope = ClassScope {
            name: "App\\Model\\User".to_string(),
            parent: Some("App\\Model\\Base".to_string()),
        };
        assert_eq!(ctx.resolve_type("?Foo", None).as_deref(), Some("Vendor\\Lib\\Foo"));
        assert_eq!(ctx.resolve_type("Foo|null", None).as_deref(), Some("Vendor\\Lib\\Foo"));
        assert_eq!(ctx.resolve_type("Foo|Bar", None), None);
        assert_eq!(ctx.resolve_type("Foo&Bar", None), None);
        assert_eq!(ctx.resolve_type("int", None), None);
        assert_eq!(ctx.resolve_type("array", None), None);
        assert_eq!(ctx.resolve_type("self", Some(&scope)).as_deref(), Some("App\\Model\\User"));
        assert_eq!(ctx.resolve_type("parent", Some(&scope)).as_deref(), Some("App\\Model\\Base"));
        assert_eq!(ctx.resolve_type("self", None), None);
        assert_eq!(ctx.resolve_type("Local", None).as_deref(), Some("App\\Model\\Local"));
    }

    #[test]
    fn import_beats_builtin_spelling() {
        let mut imports = BTreeMap::new();
        imports.insert("array".to_string(), "Vendor\\Collection\\array".to_string());
        let ctx = NameContext::new(None, imports);
        assert_eq!(
            ctx.resolve_type("array", None).as_deref(),
            Some("Vendor\\Collection\\array")
        );
    }
}
