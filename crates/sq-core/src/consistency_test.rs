use super::*;
use crate::migration_file::MigrationKind;
use chrono::NaiveDateTime;
use std::path::PathBuf;

fn file(order_key: i64, name: &str) -> MigrationFile {
    MigrationFile {
        order_key,
        name: name.to_string(),
        kind: MigrationKind::Query,
        path: PathBuf::from(name),
    }
}

fn record(id: i64, order_key: i64, name: &str, tags: Option<&str>) -> HistoryRecord {
    HistoryRecord {
        id,
        order_key,
        file: name.to_string(),
        tags: tags.map(|t| Tags::parse_list(t).unwrap()),
        applied_at: NaiveDateTime::default(),
    }
}

#[test]
fn empty_history_is_consistent() {
    let files = vec![file(1, "1-a.sql")];
    assert!(check_history(&files, &[]).is_ok());
    assert!(check_history(&[], &[]).is_ok());
}

#[test]
fn history_prefix_is_consistent() {
    let files = vec![file(1, "1-a.sql"), file(2, "2-b.sql"), file(3, "3-c.sql")];
    let history = vec![record(1, 1, "1-a.sql", None), record(2, 2, "2-b.sql", None)];
    assert!(check_history(&files, &history).is_ok());
}

#[test]
fn renamed_file_is_drift() {
    let files = vec![file(1, "1-a.sql"), file(2, "2-renamed.sql")];
    let history = vec![record(1, 1, "1-a.sql", None), record(2, 2, "2-b.sql", None)];

    match check_history(&files, &history).unwrap_err() {
        SqergeError::FilenameMismatch {
            position,
            expected,
            found,
        } => {
            assert_eq!(position, 2);
            assert_eq!(expected, "2-b.sql");
            assert_eq!(found.as_deref(), Some("2-renamed.sql"));
        }
        other => panic!("expected FilenameMismatch, got {other:?}"),
    }
}

#[test]
fn file_inserted_before_applied_ones_is_drift() {
    let files = vec![file(1, "1-a.sql"), file(2, "2-new.sql"), file(3, "3-b.sql")];
    let history = vec![record(1, 1, "1-a.sql", None), record(2, 3, "3-b.sql", None)];

    let err = check_history(&files, &history).unwrap_err();
    assert!(matches!(err, SqergeError::FilenameMismatch { position: 2, .. }));
}

#[test]
fn removed_file_is_drift_at_first_missing_position() {
    let files = vec![file(1, "1-a.sql")];
    let history = vec![record(1, 1, "1-a.sql", None), record(2, 2, "2-b.sql", None)];

    match check_history(&files, &history).unwrap_err() {
        SqergeError::FilenameMismatch {
            position, found, ..
        } => {
            assert_eq!(position, 2);
            assert_eq!(found, None);
        }
        other => panic!("expected FilenameMismatch, got {other:?}"),
    }
}

#[test]
fn changed_order_key_with_same_name_is_drift() {
    let files = vec![file(1, "1-a.sql")];
    let history = vec![record(1, 5, "1-a.sql", None)];
    assert!(check_history(&files, &history).is_err());
}

#[test]
fn recorded_tags_must_be_present() {
    let history = vec![
        record(1, 1, "1-a.sql", None),
        record(2, 2, "2-b.script", Some("solo,vader")),
    ];

    let full = Tags::parse_list("solo,vader,extra").unwrap();
    assert!(check_tags(&history, &full).is_ok());

    let partial = Tags::parse_list("solo").unwrap();
    match check_tags(&history, &partial).unwrap_err() {
        SqergeError::MissingTags { file, missing } => {
            assert_eq!(file, "2-b.script");
            assert_eq!(missing, vec!["vader".to_string()]);
        }
        other => panic!("expected MissingTags, got {other:?}"),
    }
}

#[test]
fn untagged_history_accepts_any_tags() {
    let history = vec![record(1, 1, "1-a.sql", None)];
    assert!(check_tags(&history, &Tags::new()).is_ok());
}
