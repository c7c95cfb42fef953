//! History drift and tag regression checks.
//!
//! Order key and file name are the only identity a migration has. File
//! content is never hashed, so editing an applied file goes unnoticed.

use crate::error::{SqergeError, SqergeResult};
use crate::history::HistoryRecord;
use crate::migration_file::MigrationFile;
use crate::tags::Tags;

/// Verify that `history` is a prefix of `files`.
///
/// Reports the first position (1-based) where a recorded file is renamed,
/// reordered or missing.
pub fn check_history(files: &[MigrationFile], history: &[HistoryRecord]) -> SqergeResult<()> {
    for (index, record) in history.iter().enumerate() {
        let found = files.get(index);
        let matches = found
            .is_some_and(|file| file.name == record.file && file.order_key == record.order_key);
        if !matches {
            return Err(SqergeError::FilenameMismatch {
                position: index + 1,
                expected: record.file.clone(),
                found: found.map(|f| f.name.clone()),
            });
        }
    }
    Ok(())
}

/// Verify that every recorded tag is present in this run's `tags`.
pub fn check_tags(history: &[HistoryRecord], tags: &Tags) -> SqergeResult<()> {
    for record in history {
        let Some(recorded) = &record.tags else {
            continue;
        };
        let missing = recorded.missing_from(tags);
        if !missing.is_empty() {
            return Err(SqergeError::MissingTags {
                file: record.file.clone(),
                missing,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "consistency_test.rs"]
mod tests;
