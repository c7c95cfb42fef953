//! Error types for sq-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Unique or primary key constraint violated (D004)
    ///
    /// `column` is the constrained column when the driver reports it.
    #[error("[D004] Unique constraint violated: {message}")]
    UniqueViolation {
        column: Option<String>,
        message: String,
    },

    /// Transaction management error (D005)
    #[error("[D005] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D007)
    #[error("[D007] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether the database could not be reached at all, as opposed to
    /// rejecting something it was asked to do.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionError(_))
    }

    /// Whether this error is a unique or primary key violation, with or
    /// without a known column.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    /// Whether this error is a unique violation on `column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { column: Some(c), .. } if c == column)
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so the message
        // is the only thing to classify on. Patterns are kept narrow so that
        // function/type/schema errors stay ExecutionError.
        classify_message(err.to_string())
    }
}

pub(crate) fn classify_message(msg: String) -> DbError {
    if msg.contains("Duplicate key") && msg.contains("constraint") {
        let column = unique_violation_column(&msg);
        DbError::UniqueViolation {
            column,
            message: msg,
        }
    } else if msg.contains("constraint violation: duplicate key") {
        // Reported when the conflicting row was written by the same
        // transaction; the message carries only the key value.
        DbError::UniqueViolation {
            column: None,
            message: msg,
        }
    } else if msg.contains("Table with name")
        || msg.contains("View with name")
        || msg.contains("Table or view with name")
        || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
    {
        DbError::TableNotFound(msg)
    } else {
        DbError::ExecutionError(msg)
    }
}

/// Extract the column from `Duplicate key "prefix: 2" violates ...`.
fn unique_violation_column(msg: &str) -> Option<String> {
    let rest = msg.split_once("Duplicate key \"")?.1;
    let key = rest.split_once('"').map_or(rest, |(key, _)| key);
    if key.contains(',') {
        // composite keys are reported as "a: 1, b: 2"
        return None;
    }
    let (column, _) = key.split_once(':')?;
    let column = column.trim();
    if column.is_empty() {
        return None;
    }
    Some(column.to_string())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
