//! Static PHP declaration scanner.
//!
//! Recovers namespaces, imports, classes, interfaces, traits, methods,
//! properties, and parameters from PHP source text without executing
//! or type-checking it. Structural detail is extracted lazily, on first
//! access, and cached on the owning scanner.
//!
//! # Quick start
//!
//! ```
//! use phpscan_rs::FileScanner;
//!
//! let source = "<?php
//! namespace App;
//!
//! use Vendor\\Http\\Request;
//!
//! final class Controller extends Base
//! {
//!     public function handle(Request $request, array $opts = ['a' => [1, 2]])
//!     {
//!         return $request;
//!     }
//! }
//! ";
//!
//! let file = FileScanner::new(source);
//! let class = file.class("Controller").unwrap();
//! assert_eq!(class.name(), "App\\Controller");
//! assert_eq!(class.parent_class(), Some("App\\Base"));
//!
//! let method = class.method("handle").unwrap();
//! assert_eq!(method.parameters(), vec!["request", "opts"]);
//!
//! let request = method.parameter("request").unwrap();
//! assert_eq!(request.class(), Some("Vendor\\Http\\Request"));
//!
//! let opts = method.parameter(1_usize).unwrap();
//! assert_eq!(opts.default_value(), Some("['a' => [1, 2]]"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod class;
pub mod context;
pub mod file;
pub mod index;
pub mod lexer;
pub mod method;
pub mod modifiers;
pub mod options;
pub mod parameter;
pub mod property;
pub mod token;

use std::fmt;

pub use class::{ClassKind, ClassScanner};
pub use context::{ClassScope, NameContext};
pub use file::FileScanner;
pub use index::TokenIndex;
pub use lexer::{LexError, LexErrorKind, Lexed, tokenize, tokenize_with_options};
pub use method::{MethodScanner, ParameterKey};
pub use modifiers::{Modifiers, Visibility};
pub use options::ScanOptions;
pub use parameter::ParameterScanner;
pub use property::{ConstantScanner, PropertyScanner};
pub use token::{Span, Token, TokenKind};

/// What kind of declaration a lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Function,
    Method,
    Property,
    Constant,
    Parameter,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::Constant => "constant",
            Self::Parameter => "parameter",
        };
        f.write_str(name)
    }
}

/// Errors returned by scanner queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested declaration does not exist in the scanned source.
    #[error("{kind} not found: {name}")]
    NotFound { kind: DeclarationKind, name: String },
    /// The source was lexically inconsistent (strict scans only).
    #[error("malformed source: {0}")]
    MalformedSource(#[from] LexError),
}

impl Error {
    pub(crate) fn not_found(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Scan a PHP source string with default options.
#[must_use]
pub fn scan(source: &str) -> FileScanner {
    FileScanner::new(source)
}
