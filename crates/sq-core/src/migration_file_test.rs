use super::*;
use std::fs;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), "SELECT 1;").unwrap();
}

fn names(files: &[MigrationFile]) -> Vec<&str> {
    files.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn sorts_numerically_not_lexically() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["10-ten.sql", "2-two.sql", "1-one.sql", "003-three.script"] {
        touch(dir.path(), name);
    }

    let files = list_migration_files(dir.path()).unwrap();
    assert_eq!(
        names(&files),
        vec!["1-one.sql", "2-two.sql", "003-three.script", "10-ten.sql"]
    );
    assert_eq!(files[2].order_key, 3);
    assert_eq!(files[2].kind, MigrationKind::Script);
    assert_eq!(files[0].kind, MigrationKind::Query);
    assert_eq!(files[0].path, dir.path().join("1-one.sql"));
}

#[test]
fn ignores_non_matching_entries() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "1-schema.sql",
        "README.md",
        "schema.sql",
        "2-notes.txt",
        "-3-neg.sql",
        "4-.sql",
        "5_underscore.sql",
    ] {
        touch(dir.path(), name);
    }
    fs::create_dir(dir.path().join("6-dir.sql")).unwrap();

    let files = list_migration_files(dir.path()).unwrap();
    assert_eq!(names(&files), vec!["1-schema.sql"]);
}

#[test]
fn does_not_descend_into_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "1-a.sql");
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    touch(&nested, "2-b.sql");

    let files = list_migration_files(dir.path()).unwrap();
    assert_eq!(names(&files), vec!["1-a.sql"]);
}

#[test]
fn duplicate_prefix_names_both_files() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "1-b.sql");
    touch(dir.path(), "1-a.sql");
    touch(dir.path(), "2-c.sql");

    let err = list_migration_files(dir.path()).unwrap_err();
    match err {
        SqergeError::DuplicatePrefix {
            prefix,
            file,
            conflict,
        } => {
            assert_eq!(prefix, 1);
            assert_eq!(file, "1-b.sql");
            assert_eq!(conflict, PrefixConflict::File("1-a.sql".to_string()));
        }
        other => panic!("expected DuplicatePrefix, got {other:?}"),
    }
}

#[test]
fn leading_zeros_collide_with_plain_prefix() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "01-a.sql");
    touch(dir.path(), "1-b.script");

    let err = list_migration_files(dir.path()).unwrap_err();
    assert!(matches!(err, SqergeError::DuplicatePrefix { prefix: 1, .. }));
}

#[test]
fn oversized_prefix_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "99999999999999999999999-huge.sql");

    let err = list_migration_files(dir.path()).unwrap_err();
    assert!(matches!(err, SqergeError::InvalidPrefix { .. }));
}

#[test]
fn missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = list_migration_files(&missing).unwrap_err();
    match err {
        SqergeError::DirectoryNotFound { path } => assert!(path.ends_with("nope")),
        other => panic!("expected DirectoryNotFound, got {other:?}"),
    }
}

#[test]
fn repeated_listing_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["3-c.sql", "1-a.sql", "2-b.script"] {
        touch(dir.path(), name);
    }

    let first = list_migration_files(dir.path()).unwrap();
    let second = list_migration_files(dir.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_directory_yields_no_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(list_migration_files(dir.path()).unwrap().is_empty());
}
