//! Tokenizer behaviour on whole files.

mod common;

use common::fixture;
use phpscan_rs::{LexErrorKind, ScanOptions, TokenKind, tokenize, tokenize_with_options};

// -----------------------------------------------------------
// Lossless output.
// -----------------------------------------------------------

#[test]
fn lex_fixtures_losslessly() {
    for name in ["BarClass.php", "FooClass.php", "AbstractClass.php", "BazClass.php"] {
        let source = fixture(name);
        let tokens = tokenize(&source);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, source, "fixture {name}");
    }
}

#[test]
fn lex_offsets_are_contiguous() {
    let source = fixture("BarClass.php");
    let tokens = tokenize(&source);
    let mut expected = 0;
    for token in &tokens {
        assert_eq!(token.offset, expected, "token {:?}", token.text);
        expected = token.end_offset();
    }
    assert_eq!(expected, source.len());
}

#[test]
fn lex_lines_never_decrease() {
    let tokens = tokenize(&fixture("FooClass.php"));
    assert_eq!(tokens[0].line, 1);
    assert!(tokens.windows(2).all(|w| w[0].line <= w[1].line));
}

#[test]
fn lex_empty_input() {
    assert!(tokenize("").is_empty());
}

// -----------------------------------------------------------
// Token kinds.
// -----------------------------------------------------------

#[test]
fn lex_declaration_keywords() {
    let source = "<?php ABSTRACT Class X Extends Y { Public Function f() {} }";
    let kinds: Vec<TokenKind> = tokenize(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_insignificant())
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Abstract,
            TokenKind::Class,
            TokenKind::Name,
            TokenKind::Extends,
            TokenKind::Name,
            TokenKind::OpenBrace,
            TokenKind::Public,
            TokenKind::Function,
            TokenKind::Name,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenBrace,
            TokenKind::CloseBrace,
            TokenKind::CloseBrace,
        ]
    );
}

#[test]
fn lex_member_access_keywords_are_names() {
    let tokens = tokenize("<?php $a->class; $b?->function; X::new();");
    assert!(tokens.iter().all(|t| !matches!(
        t.kind,
        TokenKind::Class | TokenKind::Function | TokenKind::New
    )));
}

#[test]
fn lex_heredoc_hides_braces() {
    let tokens = tokenize("<?php $s = <<<EOT\n  } class X {\n  EOT;\nclass Y {}");
    let classes = tokens.iter().filter(|t| t.kind == TokenKind::Class).count();
    assert_eq!(classes, 1);
}

// -----------------------------------------------------------
// Diagnostics.
// -----------------------------------------------------------

#[test]
fn lex_unterminated_comment_reports_line() {
    let lexed = tokenize_with_options("<?php\n\n/* never closed", &ScanOptions::new());
    assert_eq!(lexed.diagnostics.len(), 1);
    assert_eq!(lexed.diagnostics[0].kind, LexErrorKind::UnterminatedComment);
    assert_eq!(lexed.diagnostics[0].line, 3);
    assert_eq!(
        lexed.diagnostics[0].to_string(),
        "unterminated block comment at line 3"
    );
}

#[test]
fn lex_unterminated_heredoc() {
    let lexed = tokenize_with_options("<?php $s = <<<'END'\nbody\n", &ScanOptions::new());
    assert!(matches!(
        &lexed.diagnostics[0].kind,
        LexErrorKind::UnterminatedHeredoc { marker } if marker == "END"
    ));
}
