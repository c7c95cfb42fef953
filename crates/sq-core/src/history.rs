//! Migration history table.
//!
//! One row per applied migration file, appended in application order and
//! never updated. The unique constraints on `prefix` and `file` are what keep
//! two processes from recording the same migration twice.

use crate::error::{PrefixConflict, SqergeError, SqergeResult};
use crate::tags::{Tags, TAG_DELIMITER};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sq_db::{Database, DbError, SqlValue};

/// Default history table name.
pub const DEFAULT_HISTORY_TABLE: &str = "sqerge_migration";

/// A row of the history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// Insertion order, assigned by the store
    pub id: i64,
    pub order_key: i64,
    pub file: String,
    /// Tags the file was applied with (script migrations only)
    pub tags: Option<Tags>,
    pub applied_at: NaiveDateTime,
}

/// Reads and appends history rows through a [`Database`] handle.
///
/// The store holds no connection; every call runs on the handle it is given
/// and so joins whatever transaction is open there.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    table: String,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self {
            table: DEFAULT_HISTORY_TABLE.to_string(),
        }
    }
}

impl HistoryStore {
    /// Store backed by `table`.
    pub fn new(table: impl Into<String>) -> SqergeResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the id sequence and history table if they are absent.
    pub async fn ensure_schema(&self, db: &dyn Database) -> SqergeResult<()> {
        let table = &self.table;
        db.execute_batch(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;
             CREATE TABLE IF NOT EXISTS {table} (
                 id         BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                 prefix     BIGINT NOT NULL UNIQUE,
                 file       VARCHAR NOT NULL UNIQUE,
                 tags       VARCHAR[],
                 created_at TIMESTAMP NOT NULL DEFAULT now()
             );"
        ))
        .await?;
        Ok(())
    }

    /// Whether the history table exists.
    pub async fn exists(&self, db: &dyn Database) -> SqergeResult<bool> {
        Ok(db.relation_exists(&self.table).await?)
    }

    /// All records, oldest first.
    pub async fn read_all(&self, db: &dyn Database) -> SqergeResult<Vec<HistoryRecord>> {
        let sql = format!(
            "SELECT id, prefix, file, list_aggr(tags, 'string_agg', '{TAG_DELIMITER}'), \
             epoch_ms(created_at) \
             FROM {} ORDER BY id",
            self.table
        );
        let rows = db.query_rows(&sql, &[]).await?;
        rows.iter().map(|row| parse_record(row)).collect()
    }

    /// All records, or none when the table has not been created yet.
    pub async fn read_existing(&self, db: &dyn Database) -> SqergeResult<Vec<HistoryRecord>> {
        if !self.exists(db).await? {
            return Ok(Vec::new());
        }
        self.read_all(db).await
    }

    /// Append a record.
    ///
    /// A prefix or file name already recorded (including by the open
    /// transaction) is reported as [`SqergeError::DuplicatePrefix`] (with
    /// `position` as the history conflict position) or
    /// [`SqergeError::DuplicateFileName`]; other failures pass through.
    pub async fn insert(
        &self,
        db: &dyn Database,
        order_key: i64,
        file: &str,
        tags: Option<&Tags>,
        position: usize,
    ) -> SqergeResult<()> {
        if let Some(conflict) = self.find_conflict(db, order_key, file, position).await? {
            return Err(conflict);
        }

        let result = match tags.and_then(Tags::to_delimited) {
            Some(delimited) => {
                let sql = format!(
                    "INSERT INTO {} (prefix, file, tags) \
                     VALUES (?, ?, string_split(?, '{TAG_DELIMITER}'))",
                    self.table
                );
                db.execute_with(&sql, &[order_key.into(), file.into(), delimited.into()])
                    .await
            }
            None => {
                let sql = format!("INSERT INTO {} (prefix, file) VALUES (?, ?)", self.table);
                db.execute_with(&sql, &[order_key.into(), file.into()])
                    .await
            }
        };

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_unique_violation_on("prefix") => {
                Err(duplicate_prefix(order_key, file, position))
            }
            Err(e) if e.is_unique_violation_on("file") => Err(SqergeError::DuplicateFileName {
                file: file.to_string(),
            }),
            Err(e) if e.is_unique_violation() => {
                // Row committed by another process after the check above, and
                // reported without a column.
                match self.find_conflict(db, order_key, file, position).await {
                    Ok(Some(conflict)) => Err(conflict),
                    Ok(None) => Err(e.into()),
                    Err(recheck) => {
                        // an aborted transaction refuses further reads
                        log::debug!("conflict lookup after unique violation failed: {recheck}");
                        Err(duplicate_prefix(order_key, file, position))
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look for a recorded row sharing `order_key` or `file`.
    async fn find_conflict(
        &self,
        db: &dyn Database,
        order_key: i64,
        file: &str,
        position: usize,
    ) -> SqergeResult<Option<SqergeError>> {
        let sql = format!(
            "SELECT prefix FROM {} WHERE prefix = ? OR file = ?",
            self.table
        );
        let rows = db
            .query_rows(&sql, &[order_key.into(), file.into()])
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let prefix_taken = rows
            .iter()
            .any(|row| integer(row.first()) == Some(order_key));
        Ok(Some(if prefix_taken {
            duplicate_prefix(order_key, file, position)
        } else {
            SqergeError::DuplicateFileName {
                file: file.to_string(),
            }
        }))
    }
}

fn duplicate_prefix(order_key: i64, file: &str, position: usize) -> SqergeError {
    SqergeError::DuplicatePrefix {
        prefix: order_key,
        file: file.to_string(),
        conflict: PrefixConflict::History { position },
    }
}

fn parse_record(row: &[SqlValue]) -> SqergeResult<HistoryRecord> {
    let malformed = |what: &str| {
        SqergeError::Database(DbError::Internal(format!(
            "malformed history row ({what}): {row:?}"
        )))
    };

    let id = integer(row.first()).ok_or_else(|| malformed("id"))?;
    let order_key = integer(row.get(1)).ok_or_else(|| malformed("prefix"))?;
    let file = row
        .get(2)
        .and_then(SqlValue::as_str)
        .ok_or_else(|| malformed("file"))?
        .to_string();
    let tags = match row.get(3).and_then(SqlValue::as_str) {
        Some(list) => Some(Tags::parse_list(list)?),
        None => None,
    };
    let applied_at = integer(row.get(4))
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|ts| ts.naive_utc())
        .ok_or_else(|| malformed("created_at"))?;

    Ok(HistoryRecord {
        id,
        order_key,
        file,
        tags,
        applied_at,
    })
}

/// Integers may come back as text depending on the driver's coercion.
fn integer(value: Option<&SqlValue>) -> Option<i64> {
    match value? {
        SqlValue::Integer(n) => Some(*n),
        SqlValue::Text(s) => s.parse().ok(),
        SqlValue::Null => None,
    }
}

fn validate_table_name(table: &str) -> SqergeResult<()> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SqergeError::ConfigInvalid {
            message: format!(
                "invalid history table name '{table}': use letters, digits and underscores"
            ),
        })
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
