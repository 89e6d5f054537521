//! Parameter classification and type resolution.

mod common;

use common::{BAR_CLASS, class, method, scan_fixture};
use phpscan_rs::{FileScanner, MethodScanner};

fn function<'a>(file: &'a FileScanner, name: &str) -> &'a MethodScanner {
    file.function(name)
        .unwrap_or_else(|e| panic!("{e}\n--- functions ---\n{:?}", file.functions()))
}

#[test]
fn fixture_parameter_details() {
    let file = scan_fixture("BarClass.php");
    let bar = class(&file, BAR_CLASS);

    let o = method(bar, "two").parameter("o").expect("o");
    assert_eq!(o.type_hint(), Some("\\ArrayObject"));
    assert_eq!(o.class(), Some("ArrayObject"));
    assert!(o.is_optional());
    assert!(o.allows_null());

    let three = method(bar, "three");
    let first = three.parameter(0_usize).expect("o");
    assert_eq!(first.type_hint(), None);
    assert!(!first.is_optional());
    assert!(!first.is_passed_by_reference());
    assert_eq!(first.line(), 27);
    assert_eq!(three.parameter("$bbf").expect("bbf").default_value(), Some("null"));
}

#[test]
fn imported_builtin_name_resolves_to_import() {
    let file = FileScanner::new(
        "<?php namespace App;\nuse Collections\\Vector as array;\nfunction f(array $a, iterable $b) {}\n",
    );
    let f = function(&file, "f");
    assert_eq!(f.parameter("a").expect("a").class(), Some("Collections\\Vector"));
    assert_eq!(f.parameter("b").expect("b").class(), None);
}

#[test]
fn parameter_count_matches_top_level_commas() {
    let file = FileScanner::new(
        "<?php function f(\n    array $a = [1, 2, [3, 4]],\n    $b = array('x' => fn($y) => $y, 'z' => 1),\n    string|int $c = \"a, b\",\n    ...$rest,\n) {}\n",
    );
    let f = function(&file, "f");
    assert_eq!(f.parameters(), vec!["a", "b", "c", "rest"]);
    assert_eq!(
        f.parameter("b").expect("b").default_value(),
        Some("array('x' => fn($y) => $y, 'z' => 1)")
    );
    assert_eq!(f.parameter("c").expect("c").default_value(), Some("\"a, b\""));
    assert_eq!(f.parameter("c").expect("c").class(), None);
    assert_eq!(f.parameter("rest").expect("rest").position(), 3);
    assert_eq!(f.parameter("b").expect("b").line(), 3);
}

#[test]
fn nullable_and_union_hints() {
    let file = FileScanner::new(
        "<?php namespace N;\nfunction f(?Foo $a, Bar|null $b, Baz|Qux $c, A&B $d, int $e, mixed $m) {}\n",
    );
    let f = function(&file, "f");
    let a = f.parameter("a").expect("a");
    assert_eq!(a.class(), Some("N\\Foo"));
    assert!(a.allows_null());

    let b = f.parameter("b").expect("b");
    assert_eq!(b.class(), Some("N\\Bar"));
    assert!(b.allows_null());

    assert_eq!(f.parameter("c").expect("c").class(), None);
    assert_eq!(f.parameter("d").expect("d").class(), None);

    let e = f.parameter("e").expect("e");
    assert_eq!(e.class(), None);
    assert!(!e.allows_null());
    assert!(f.parameter("m").expect("m").allows_null());
}

#[test]
fn attributes_and_references() {
    let file = FileScanner::new(
        "<?php function f(#[SensitiveParameter] string &$secret, array &...$refs) {}\n",
    );
    let f = function(&file, "f");
    let secret = f.parameter("secret").expect("secret");
    assert_eq!(secret.type_hint(), Some("string"));
    assert!(secret.is_passed_by_reference());

    let refs = f.parameter("refs").expect("refs");
    assert!(refs.is_passed_by_reference());
    assert!(refs.is_variadic());
}
