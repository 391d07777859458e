//! Imports against real files in temporary directories.

use lacon::{convert, from_path, lacon, parse_with_base, Error};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

#[test]
fn test_import_merges_into_current_scope() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.lacon", "host localhost\nport 80");
    write(
        dir.path(),
        "main.lacon",
        "name app\nserver {\n  @import base.lacon\n  port 8080\n}",
    );

    let doc = from_path(dir.path().join("main.lacon")).unwrap();
    assert_eq!(
        doc,
        lacon!({ "name": "app", "server": { "host": "localhost", "port": 8080 } })
    );
}

#[test]
fn test_unindented_import_lands_in_open_block() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b.lacon", "x 1");

    let doc = parse_with_base("a\n  y 2\n@import b.lacon\nz 3", dir.path()).unwrap();
    assert_eq!(doc, lacon!({ "a": { "y": 2, "x": 1 }, "z": 3 }));
}

#[test]
fn test_import_as_value() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared/db.lacon", "user admin\npool 4");

    let text = "db @import=shared/db.lacon\nother @import=\"shared/db.lacon\"";
    let doc = parse_with_base(text, dir.path()).unwrap();
    let db = lacon!({ "user": "admin", "pool": 4 });
    assert_eq!(doc.pointer(&["db"]), Some(&db));
    assert_eq!(doc.pointer(&["other"]), Some(&db));
}

#[test]
fn test_nested_imports_resolve_relative_to_importer() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a/one.lacon", "@import ../b/two.lacon\nfrom_one true");
    write(dir.path(), "b/two.lacon", "@import ./three.lacon\nfrom_two true");
    write(dir.path(), "b/three.lacon", "from_three true");

    let origin = dir.path().join("main.lacon");
    let json = convert("@import a/one.lacon", Some(&origin)).unwrap();
    assert_eq!(
        json,
        "{\n  \"from_three\": true,\n  \"from_two\": true,\n  \"from_one\": true\n}"
    );
}

#[test]
fn test_variables_do_not_cross_imports() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "child.lacon", "seen \"$secret\"");

    let doc = parse_with_base("$secret 42\n@import child.lacon", dir.path()).unwrap();
    assert_eq!(doc, lacon!({ "seen": "$secret" }));
}

#[test]
fn test_repeated_import_is_not_a_cycle() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "part.lacon", "x 1");

    let doc = parse_with_base("a @import=part.lacon\nb @import=part.lacon", dir.path()).unwrap();
    assert_eq!(doc, lacon!({ "a": { "x": 1 }, "b": { "x": 1 } }));
}

#[test]
fn test_circular_import_reports_chain() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.lacon", "@import b.lacon");
    write(dir.path(), "b.lacon", "@import a.lacon");

    let err = from_path(dir.path().join("a.lacon")).unwrap_err();
    match err {
        Error::CircularImport { path, chain } => {
            assert!(path.ends_with("a.lacon"));
            assert_eq!(chain.len(), 2);
            assert!(chain[1].ends_with("b.lacon"));
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_self_import_is_a_cycle() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "self.lacon", "a 1\n@import self.lacon");

    let err = from_path(dir.path().join("self.lacon")).unwrap_err();
    assert!(matches!(err, Error::CircularImport { .. }));
}

#[test]
fn test_missing_import() {
    let dir = TempDir::new().unwrap();
    let err = parse_with_base("@import nowhere.lacon", dir.path()).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
    assert!(err.path().map_or(false, |p| p.ends_with("nowhere.lacon")));
}

#[test]
fn test_unreadable_import_is_io_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bin.lacon"), [0xffu8, 0xfe, 0x00]).unwrap();

    let err = parse_with_base("@import bin.lacon", dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_from_path_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = from_path(dir.path().join("absent.lacon")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
