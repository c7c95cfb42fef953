//! Script migrations.
//!
//! A `.script` file on disk is only a marker that fixes the migration's place
//! in the order. What it does is compiled into the host program and looked
//! up here by file name: either a ready-made query or an async callback that
//! drives the transaction-scoped [`Database`] handle itself.

use crate::error::{SqergeError, SqergeResult};
use crate::tags::Tags;
use async_trait::async_trait;
use futures::future::BoxFuture;
use sq_db::{Database, DbError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure inside a script migration.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A statement issued through the handle failed
    #[error(transparent)]
    Database(#[from] DbError),

    /// The script gave up for its own reasons
    #[error("{0}")]
    Failed(String),
}

pub type ScriptResult<T> = Result<T, ScriptError>;

/// A migration written as code.
///
/// `db` is the handle of the run's open transaction; everything issued
/// through it commits or rolls back with the rest of the pending files.
#[async_trait]
pub trait ScriptMigration: Send + Sync {
    async fn run(&self, db: &dyn Database, tags: &Tags) -> ScriptResult<()>;
}

type ScriptFn =
    dyn for<'a> Fn(&'a dyn Database, &'a Tags) -> BoxFuture<'a, ScriptResult<()>> + Send + Sync;

struct FnScript(Box<ScriptFn>);

#[async_trait]
impl ScriptMigration for FnScript {
    async fn run(&self, db: &dyn Database, tags: &Tags) -> ScriptResult<()> {
        (self.0)(db, tags).await
    }
}

/// What a script migration exposes.
#[derive(Clone)]
pub enum ScriptExport {
    /// SQL run verbatim
    Query(String),
    /// Callback receiving the transaction handle and the run's tags
    Callable(Arc<dyn ScriptMigration>),
}

impl fmt::Debug for ScriptExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptExport::Query(sql) => f.debug_tuple("Query").field(sql).finish(),
            ScriptExport::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// File name to [`ScriptExport`] table, filled in by the host program.
#[derive(Default, Clone)]
pub struct ScriptRegistry {
    exports: HashMap<String, ScriptExport>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made query for `file`.
    pub fn register_query(mut self, file: impl Into<String>, sql: impl Into<String>) -> Self {
        self.exports
            .insert(file.into(), ScriptExport::Query(sql.into()));
        self
    }

    /// Register a [`ScriptMigration`] implementation for `file`.
    pub fn register(mut self, file: impl Into<String>, script: Arc<dyn ScriptMigration>) -> Self {
        self.exports
            .insert(file.into(), ScriptExport::Callable(script));
        self
    }

    /// Register a closure for `file`.
    ///
    /// ```ignore
    /// registry.register_fn("3-people.script", |db, tags| Box::pin(async move {
    ///     db.execute("INSERT INTO person (name) VALUES ('Luke')").await?;
    ///     if tags.contains("solo") {
    ///         db.execute("INSERT INTO person (name) VALUES ('Han')").await?;
    ///     }
    ///     Ok(())
    /// }))
    /// ```
    pub fn register_fn<F>(self, file: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Database, &'a Tags) -> BoxFuture<'a, ScriptResult<()>>
            + Send
            + Sync
            + 'static,
    {
        self.register(file, Arc::new(FnScript(Box::new(f))))
    }

    pub fn get(&self, file: &str) -> Option<&ScriptExport> {
        self.exports.get(file)
    }

    /// Run the export registered for `file` against `db`.
    ///
    /// A missing registration or an empty query is an authoring mistake and
    /// yields [`SqergeError::InvalidScriptExport`]. Statement failures come
    /// back as [`SqergeError::Database`], the same as for plain SQL files.
    pub async fn execute(&self, file: &str, db: &dyn Database, tags: &Tags) -> SqergeResult<()> {
        let export = match self.get(file) {
            Some(ScriptExport::Query(sql)) if sql.trim().is_empty() => None,
            other => other,
        };
        let Some(export) = export else {
            return Err(SqergeError::InvalidScriptExport {
                file: file.to_string(),
            });
        };

        let result = match export {
            ScriptExport::Query(sql) => {
                log::debug!("{file}: running registered query");
                db.execute_batch(sql).await.map_err(ScriptError::from)
            }
            ScriptExport::Callable(script) => {
                log::debug!("{file}: running registered callable");
                script.run(db, tags).await
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(ScriptError::Database(e)) => Err(SqergeError::Database(e)),
            Err(ScriptError::Failed(message)) => Err(SqergeError::Script {
                file: file.to_string(),
                message,
            }),
        }
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut files: Vec<&String> = self.exports.keys().collect();
        files.sort();
        f.debug_struct("ScriptRegistry")
            .field("files", &files)
            .finish()
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
