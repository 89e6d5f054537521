#![allow(dead_code)]

use std::path::PathBuf;

use phpscan_rs::{ClassScanner, FileScanner, MethodScanner};

/// Read a PHP fixture from `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect();
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Scan a fixture file.
pub fn scan_fixture(name: &str) -> FileScanner {
    FileScanner::new(&fixture(name))
}

/// Look up a class in a scanned file, panicking with context.
pub fn class<'a>(file: &'a FileScanner, name: &str) -> &'a ClassScanner {
    file.class(name)
        .unwrap_or_else(|e| panic!("{e}\n--- classes ---\n{:?}", file.classes()))
}

/// Look up a method in a class, panicking with context.
pub fn method<'a>(class: &'a ClassScanner, name: &str) -> &'a MethodScanner {
    class
        .method(name)
        .unwrap_or_else(|e| panic!("{e}\n--- methods ---\n{:?}", class.methods()))
}

pub const BAR_CLASS: &str = "ZendTest\\Code\\TestAsset\\BarClass";
pub const FOO_CLASS: &str = "ZendTest\\Code\\TestAsset\\FooClass";
pub const ABSTRACT_CLASS: &str = "ZendTest\\Code\\TestAsset\\AbstractClass";
