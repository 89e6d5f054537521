//! Class header and member scanning.

mod common;

use common::{BAR_CLASS, FOO_CLASS, class, scan_fixture};
use phpscan_rs::{ClassKind, DeclarationKind, Error, FileScanner, Visibility};

// -----------------------------------------------------------
// Headers.
// -----------------------------------------------------------

#[test]
fn class_header_from_fixture() {
    let file = scan_fixture("BarClass.php");
    let bar = class(&file, BAR_CLASS);
    assert_eq!(bar.short_name(), "BarClass");
    assert_eq!(bar.namespace(), Some("ZendTest\\Code\\TestAsset"));
    assert_eq!(bar.kind(), ClassKind::Class);
    assert_eq!(bar.parent_class(), Some("ArrayObject"));
    assert_eq!(bar.interfaces(), ["Countable"]);
    assert!(!bar.is_abstract());
    assert_eq!(bar.line_start(), 11);
}

#[test]
fn abstract_class_with_interfaces() {
    let file = scan_fixture("FooClass.php");
    let foo = class(&file, FOO_CLASS);
    assert!(foo.is_abstract());
    assert_eq!(foo.parent_class(), None);
    assert_eq!(foo.interfaces(), ["ArrayAccess", "Countable"]);
}

#[test]
fn interface_extends_many() {
    let file = FileScanner::new(
        "<?php namespace N;\nuse Other\\Base;\ninterface Both extends Base, \\Countable {\n    public function size(): int;\n}\n",
    );
    let both = class(&file, "N\\Both");
    assert!(both.is_interface());
    assert_eq!(both.parent_class(), None);
    assert_eq!(both.interfaces(), ["Other\\Base", "Countable"]);
    let size = both.method("size").expect("size");
    assert!(size.is_abstract());
    assert_eq!(size.body(), "");
}

#[test]
fn traits_and_enums() {
    let file = FileScanner::new(
        "<?php\ntrait Greets { public function hi() {} }\n\
         enum Suit: string implements HasLabel {\n    case Hearts = 'H';\n    const Wild = self::Hearts;\n    public function label(): string { return ucfirst($this->name); }\n}\n\
         final readonly class Point { use Greets; public function __construct(public int $x = 0) {} }\n",
    );
    assert_eq!(file.classes(), vec!["Greets", "Suit", "Point"]);

    assert!(class(&file, "Greets").is_trait());

    let suit = class(&file, "Suit");
    assert!(suit.is_enum());
    assert_eq!(suit.interfaces(), ["HasLabel"]);
    assert_eq!(suit.methods(), vec!["label"]);
    assert_eq!(suit.constants(), vec!["Wild"]);

    let point = class(&file, "Point");
    assert!(point.is_final());
    assert!(point.is_readonly());
    assert_eq!(point.traits(), ["Greets"]);
    let ctor = point.method("__construct").expect("ctor");
    let x = ctor.parameter("x").expect("x");
    assert_eq!(x.promoted(), Some(Visibility::Public));
    assert_eq!(x.default_value(), Some("0"));
}

#[test]
fn class_extending_enum_base() {
    let file = FileScanner::new(
        "<?php namespace App; use MyCLabs\\Enum\\Enum;\n\
         final class Status extends Enum { public function label() {} }\n",
    );
    assert_eq!(file.classes(), vec!["App\\Status"]);
    assert!(file.functions().is_empty());

    let status = class(&file, "Status");
    assert_eq!(status.kind(), ClassKind::Class);
    assert_eq!(status.parent_class(), Some("MyCLabs\\Enum\\Enum"));
    assert_eq!(status.methods(), vec!["label"]);
}

#[test]
fn class_named_enum() {
    let file = FileScanner::new(
        "<?php namespace MyCLabs\\Enum;\n\
         abstract class Enum { public function getValue() {} }\n\
         enum Suit { case Hearts; }\n",
    );
    assert_eq!(file.classes(), vec!["MyCLabs\\Enum\\Enum", "MyCLabs\\Enum\\Suit"]);

    let base = class(&file, "Enum");
    assert!(base.is_abstract());
    assert_eq!(base.methods(), vec!["getValue"]);
    assert!(class(&file, "Suit").is_enum());
}

#[test]
fn namespace_named_enum() {
    let file = FileScanner::new("<?php namespace Enum;\nclass Color {}\n");
    assert_eq!(file.namespace(), Some("Enum"));
    assert_eq!(file.classes(), vec!["Enum\\Color"]);
}

// -----------------------------------------------------------
// Members.
// -----------------------------------------------------------

#[test]
fn constants_in_order() {
    let file = scan_fixture("FooClass.php");
    let foo = class(&file, FOO_CLASS);
    assert_eq!(foo.constants(), vec!["BAR", "FOO", "BAZ"]);
    assert_eq!(foo.constant("FOO").expect("FOO").value(), Some("self::BAR"));
    let baz = foo.constant("BAZ").expect("BAZ");
    assert_eq!(baz.value(), Some("'baz'"));
    assert!(baz.doc_comment().is_some_and(|d| d.contains("Constant with a docblock.")));
}

#[test]
fn properties_with_defaults() {
    let file = scan_fixture("FooClass.php");
    let foo = class(&file, FOO_CLASS);
    assert_eq!(foo.properties(), vec!["bar", "foo", "baz"]);

    let bar = foo.property("bar").expect("bar");
    assert!(bar.is_static());
    assert!(bar.is_protected());
    assert_eq!(bar.default_value(), Some("'value'"));

    let baz = foo.property("$baz").expect("baz");
    assert!(baz.is_private());
    assert_eq!(
        baz.default_value(),
        Some("['foo' => 'bar', 'bar' => ['baz' => 'foo']]")
    );
    assert!(baz.doc_comment().is_some_and(|d| d.contains("@var array")));
}

#[test]
fn property_list_shares_modifiers() {
    let file = FileScanner::new("<?php class A { private ?int $a = 1, $b; }");
    let a = class(&file, "A");
    assert_eq!(a.properties(), vec!["a", "b"]);
    let b = a.property("b").expect("b");
    assert!(b.is_private());
    assert_eq!(b.type_hint(), Some("?int"));
    assert_eq!(b.default_value(), None);
}

#[test]
fn method_names_in_order() {
    let file = scan_fixture("BarClass.php");
    let bar = class(&file, BAR_CLASS);
    assert_eq!(bar.methods(), vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn nested_braces_do_not_end_class() {
    let file = FileScanner::new(
        "<?php class A {\n  public function f() { if (true) { $s = \"}\"; } }\n  public function g() {}\n}\nclass B {}\n",
    );
    assert_eq!(file.classes(), vec!["A", "B"]);
    assert_eq!(class(&file, "A").methods(), vec!["f", "g"]);
    assert_eq!(class(&file, "A").line_end(), 4);
}

#[test]
fn self_and_parent_type_hints() {
    let file = FileScanner::new(
        "<?php namespace App;\nclass Child extends Base {\n  public function a(self $s, parent $p, static $x) {}\n}\n",
    );
    let m = class(&file, "Child").method("a").expect("a");
    assert_eq!(m.parameter("s").expect("s").class(), Some("App\\Child"));
    assert_eq!(m.parameter("p").expect("p").class(), Some("App\\Base"));
    assert_eq!(m.declaring_class(), Some("App\\Child"));
}

#[test]
fn missing_members_are_not_found() {
    let file = scan_fixture("BarClass.php");
    let bar = class(&file, BAR_CLASS);
    assert!(matches!(
        bar.method("six"),
        Err(Error::NotFound { kind: DeclarationKind::Method, .. })
    ));
    assert!(matches!(
        bar.property("nope"),
        Err(Error::NotFound { kind: DeclarationKind::Property, .. })
    ));
    assert!(matches!(
        bar.constant("NOPE"),
        Err(Error::NotFound { kind: DeclarationKind::Constant, .. })
    ));
}
