//! Error types for sq-core

use sq_db::DbError;
use std::fmt;
use thiserror::Error;

/// Where the second claim on an order key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixConflict {
    /// Another file in the migration directory uses the same prefix.
    File(String),
    /// The history table already holds the prefix; `position` is the 1-based
    /// position of the pending file whose insert was rejected.
    History { position: usize },
}

impl fmt::Display for PrefixConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixConflict::File(other) => write!(f, "also used by '{other}'"),
            PrefixConflict::History { position } => {
                write!(f, "already recorded in migration history (file {position})")
            }
        }
    }
}

/// Every way a sqerge run can fail.
///
/// All variants are terminal for the run; nothing is retried internally.
#[derive(Error, Debug)]
pub enum SqergeError {
    /// S001: Migration directory missing
    #[error("[S001] Directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// S002: Two claims on the same order key
    #[error("[S002] Prefix {prefix} in '{file}' is already in use: {conflict}")]
    DuplicatePrefix {
        prefix: i64,
        file: String,
        conflict: PrefixConflict,
    },

    /// S003: Files disagree with recorded history
    #[error(
        "[S003] File {position} ({}) does not match '{expected}' in migration history",
        .found.as_deref().unwrap_or("missing")
    )]
    FilenameMismatch {
        position: usize,
        expected: String,
        found: Option<String>,
    },

    /// S004: A previously applied file used tags absent from this run
    #[error("[S004] '{file}' was applied with tag(s) missing from this run: {}", .missing.join(", "))]
    MissingTags { file: String, missing: Vec<String> },

    /// S005: A script file exposes neither a query nor a callable
    #[error("[S005] Script migration '{file}' has no registered query or callable")]
    InvalidScriptExport { file: String },

    /// S006: The database rejected a statement of a pending file
    #[error("[S006] (migration reverted on query error) file {position} ({file}): {message}")]
    SqlExecution {
        file: String,
        position: usize,
        message: String,
    },

    /// S007: File name already present in history
    #[error("[S007] File '{file}' is already recorded in migration history")]
    DuplicateFileName { file: String },

    /// S008: Prefix does not fit an order key
    #[error("[S008] Prefix of '{file}' is not a valid order key")]
    InvalidPrefix { file: String },

    /// S009: A script callable failed for a reason other than SQL
    #[error("[S009] Script migration '{file}' failed: {message}")]
    Script { file: String, message: String },

    /// S010: IO error with path context
    #[error("[S010] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// S011: Configuration file not found
    #[error("[S011] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// S012: Invalid configuration value
    #[error("[S012] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// S013: Failed to parse configuration file
    #[error("[S013] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Database error passed through unchanged
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Result type alias for SqergeError
pub type SqergeResult<T> = Result<T, SqergeError>;

impl SqergeError {
    /// Whether the database could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, SqergeError::Database(e) if e.is_connection_error())
    }

    /// Whether this error came straight from the database driver rather
    /// than from a sqerge check.
    pub fn is_database_error(&self) -> bool {
        matches!(self, SqergeError::Database(_))
    }
}
