use super::*;
use tempfile::TempDir;

fn global(database: Option<&str>, config: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        database: database.map(String::from),
        config: config.map(String::from),
    }
}

#[test]
fn test_error_label_for_sqerge_errors() {
    let err = anyhow::Error::from(SqergeError::InvalidScriptExport {
        file: "2-x.script".to_string(),
    });
    assert_eq!(error_label(&err), "(error)");
}

#[test]
fn test_error_label_for_database_errors() {
    let err = anyhow::Error::from(SqergeError::Database(DbError::ConnectionError(
        "refused".to_string(),
    )));
    assert_eq!(error_label(&err), "(database error)");

    let wrapped = anyhow::Error::from(DbError::ConnectionError("refused".to_string()))
        .context("Failed to connect to database 'x'");
    assert_eq!(error_label(&wrapped), "(database error)");
}

#[test]
fn test_calculate_column_widths() {
    let rows = vec![
        vec!["1".to_string(), "1-create.sql".to_string()],
        vec!["20".to_string(), "20-b.sql".to_string()],
    ];
    assert_eq!(calculate_column_widths(&["prefix", "file"], &rows), vec![6, 12]);
}

#[test]
fn test_load_config_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.yml");
    std::fs::write(&path, "migrations_dir: sql\nhistory_table: log").unwrap();

    let config = load_config(&global(None, path.to_str())).unwrap();
    assert_eq!(config.migrations_dir, "sql");
    assert_eq!(config.history_table, "log");
}

#[test]
fn test_load_config_missing_explicit_path_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yml");
    assert!(load_config(&global(None, path.to_str())).is_err());
}

#[test]
fn test_context_prefers_database_flag() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("sqerge.yml");
    std::fs::write(&config_path, "database:\n  path: /nonexistent/dir/never.duckdb").unwrap();

    let ctx = CommandContext::new(&global(Some(":memory:"), config_path.to_str())).unwrap();
    assert_eq!(ctx.db.db_type(), "duckdb");
    assert_eq!(ctx.migrations_dir(None), PathBuf::from("migrations"));
    assert_eq!(ctx.migrations_dir(Some("other")), PathBuf::from("other"));
}
