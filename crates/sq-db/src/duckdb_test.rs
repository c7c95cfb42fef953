use super::*;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_new_memory_special_case() {
    let db = DuckDbBackend::new(":memory:").unwrap();
    assert!(!db.relation_exists("anything").await.unwrap());
}

#[tokio::test]
async fn test_from_path_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.duckdb");
    {
        let db = DuckDbBackend::from_path(&path).unwrap();
        db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();
    }
    assert!(path.exists());

    let reopened = DuckDbBackend::from_path(&path).unwrap();
    assert!(reopened.relation_exists("t").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_path_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("db.duckdb");
    let err = DuckDbBackend::from_path(&path).err().unwrap();
    assert!(err.is_connection_error(), "got {err:?}");
}

#[tokio::test]
async fn test_execute_batch() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);",
    )
    .await
    .unwrap();

    assert!(db.relation_exists("t1").await.unwrap());
    assert!(db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
async fn test_execute_with_params_and_query_rows() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE people (id BIGINT, name VARCHAR, nick VARCHAR)")
        .await
        .unwrap();

    let inserted = db
        .execute_with(
            "INSERT INTO people VALUES (?, ?, ?)",
            &[1i64.into(), "Luke".into(), SqlValue::Null],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 1);

    let rows = db
        .query_rows("SELECT id, name, nick FROM people WHERE id = ?", &[1i64.into()])
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![
            SqlValue::Integer(1),
            SqlValue::Text("Luke".to_string()),
            SqlValue::Null
        ]]
    );
}

#[tokio::test]
async fn test_query_one() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE users (id INT, name VARCHAR); INSERT INTO users VALUES (2, 'Bob');")
        .await
        .unwrap();

    let name = db.query_one("SELECT name FROM users WHERE id = 2").await.unwrap();
    assert_eq!(name, Some("Bob".to_string()));

    let missing = db.query_one("SELECT name FROM users WHERE id = 3").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_relation_exists_schema_qualified() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE SCHEMA staging; CREATE TABLE staging.t (id INT)")
        .await
        .unwrap();

    assert!(db.relation_exists("staging.t").await.unwrap());
    assert!(!db.relation_exists("t").await.unwrap());
}

#[tokio::test]
async fn test_rollback_discards_ddl() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.begin().await.unwrap();
    db.execute_batch("CREATE TABLE scratch (id INT); INSERT INTO scratch VALUES (1);")
        .await
        .unwrap();
    db.rollback().await.unwrap();

    assert!(!db.relation_exists("scratch").await.unwrap());
}

#[tokio::test]
async fn test_commit_keeps_changes() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.begin().await.unwrap();
    db.execute("CREATE TABLE kept (id INT)").await.unwrap();
    db.commit().await.unwrap();

    assert!(db.relation_exists("kept").await.unwrap());
}

#[tokio::test]
async fn test_commit_without_transaction_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db.commit().await.unwrap_err();
    assert!(matches!(err, DbError::TransactionError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unique_violation_reports_column() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE m (prefix BIGINT UNIQUE, file VARCHAR UNIQUE)")
        .await
        .unwrap();
    db.execute_with("INSERT INTO m VALUES (?, ?)", &[1i64.into(), "1-a.sql".into()])
        .await
        .unwrap();

    let err = db
        .execute_with("INSERT INTO m VALUES (?, ?)", &[1i64.into(), "1-b.sql".into()])
        .await
        .unwrap_err();
    assert!(err.is_unique_violation_on("prefix"), "got {err:?}");
}

#[tokio::test]
async fn test_unique_violation_within_one_transaction() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE u (prefix INTEGER UNIQUE)")
        .await
        .unwrap();

    db.begin().await.unwrap();
    db.execute("INSERT INTO u VALUES (1)").await.unwrap();
    let err = db.execute("INSERT INTO u VALUES (1)").await.unwrap_err();
    db.rollback().await.unwrap();

    assert!(err.is_unique_violation(), "got {err:?}");
}

#[tokio::test]
async fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    let err = db
        .execute_batch("INSERT INTO does_not_exist VALUES (1)")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)), "got {err:?}");
}
