//! Migration file discovery.
//!
//! A migration directory is flat. Entries named `<digits>-<anything>.sql` or
//! `<digits>-<anything>.script` are migrations; everything else is ignored.
//! The leading digits are the order key.

use crate::error::{PrefixConflict, SqergeError, SqergeResult};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Extension of query migrations.
pub const QUERY_EXTENSION: &str = "sql";

/// Extension of script migrations.
pub const SCRIPT_EXTENSION: &str = "script";

static FILE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn file_pattern() -> &'static Regex {
    FILE_PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)-.+\.(sql|script)$").expect("valid regex literal"))
}

/// How a migration file is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationKind {
    /// Raw SQL, run verbatim
    Query,
    /// Resolved through the script registry
    Script,
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationKind::Query => write!(f, "query"),
            MigrationKind::Script => write!(f, "script"),
        }
    }
}

/// One migration file found in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    /// Integer parsed from the name prefix
    pub order_key: i64,
    /// File name, e.g. `1-schema.sql`
    pub name: String,
    pub kind: MigrationKind,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Build a descriptor from a file name, or `None` if the name is not a
    /// migration name.
    pub fn from_name(dir: &Path, name: &str) -> Option<SqergeResult<Self>> {
        let captures = file_pattern().captures(name)?;
        let kind = match &captures[2] {
            QUERY_EXTENSION => MigrationKind::Query,
            _ => MigrationKind::Script,
        };
        let order_key = match captures[1].parse::<i64>() {
            Ok(key) => key,
            Err(_) => {
                return Some(Err(SqergeError::InvalidPrefix {
                    file: name.to_string(),
                }))
            }
        };

        Some(Ok(Self {
            order_key,
            name: name.to_string(),
            kind,
            path: dir.join(name),
        }))
    }
}

/// List the migration files in `dir`, sorted by order key.
///
/// Fails on a missing directory and on two files sharing an order key.
pub fn list_migration_files(dir: &Path) -> SqergeResult<Vec<MigrationFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SqergeError::DirectoryNotFound {
            path: dir.display().to_string(),
        },
        _ => SqergeError::Io {
            path: dir.display().to_string(),
            source: e,
        },
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SqergeError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !entry.path().is_file() {
            continue;
        }
        if let Some(file) = MigrationFile::from_name(dir, &name) {
            files.push(file?);
        }
    }

    // Name as secondary key keeps duplicate reports stable across platforms.
    files.sort_by(|a, b| a.order_key.cmp(&b.order_key).then_with(|| a.name.cmp(&b.name)));

    if let Some(pair) = files.windows(2).find(|w| w[0].order_key == w[1].order_key) {
        return Err(SqergeError::DuplicatePrefix {
            prefix: pair[1].order_key,
            file: pair[1].name.clone(),
            conflict: PrefixConflict::File(pair[0].name.clone()),
        });
    }

    log::debug!("{} migration file(s) in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
#[path = "migration_file_test.rs"]
mod tests;
