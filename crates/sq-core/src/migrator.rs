//! The migration applier.
//!
//! A run goes `Scanning -> Verifying -> Applying(i) -> Committed`,
//! ending in `RolledBack`/`Failed` on error. Verification happens outside
//! any transaction; the pending files share one transaction so a failure in
//! any of them undoes all of them.

use crate::consistency::{check_history, check_tags};
use crate::error::{SqergeError, SqergeResult};
use crate::event::{LogReporter, MigrationEvent, MigrationReporter};
use crate::history::{HistoryRecord, HistoryStore};
use crate::migration_file::{list_migration_files, MigrationFile, MigrationKind};
use crate::script::ScriptRegistry;
use crate::tags::Tags;
use serde::Serialize;
use sq_db::{Database, DbError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Scanning,
    Verifying,
    /// Applying the pending file at this 1-based position
    Applying(usize),
    Committed,
    RolledBack,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Scanning => write!(f, "scanning"),
            RunPhase::Verifying => write!(f, "verifying"),
            RunPhase::Applying(position) => write!(f, "applying file {position}"),
            RunPhase::Committed => write!(f, "committed"),
            RunPhase::RolledBack => write!(f, "rolled back"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Files and history after a successful verification.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub directory: PathBuf,
    pub files: Vec<MigrationFile>,
    pub history: Vec<HistoryRecord>,
}

impl MigrationPlan {
    /// Files already recorded in history.
    pub fn applied(&self) -> &[MigrationFile] {
        &self.files[..self.split()]
    }

    /// Files beyond the recorded history, in application order.
    pub fn pending(&self) -> &[MigrationFile] {
        &self.files[self.split()..]
    }

    fn split(&self) -> usize {
        self.history.len().min(self.files.len())
    }
}

/// Outcome of a successful `migrate` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub already_applied: usize,
    /// Names of the files applied by this run, in order
    pub applied: Vec<String>,
}

impl RunSummary {
    pub fn newly_applied(&self) -> usize {
        self.applied.len()
    }
}

/// Applies a migration directory to a database.
///
/// Holds the database handle explicitly; the handle is shared, not owned,
/// so the caller decides when the connection goes away.
pub struct Migrator {
    db: Arc<dyn Database>,
    store: HistoryStore,
    scripts: ScriptRegistry,
    reporter: Arc<dyn MigrationReporter>,
}

impl Migrator {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            store: HistoryStore::default(),
            scripts: ScriptRegistry::default(),
            reporter: Arc::new(LogReporter),
        }
    }

    /// Use a history store other than the default `sqerge_migration` table.
    pub fn with_history_store(mut self, store: HistoryStore) -> Self {
        self.store = store;
        self
    }

    /// Script migrations available to this migrator.
    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn MigrationReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.store
    }

    /// Scan `dir` and verify it against history without applying anything.
    pub async fn plan(&self, dir: &Path) -> SqergeResult<MigrationPlan> {
        self.enter(RunPhase::Scanning);
        let files = list_migration_files(dir)?;
        self.emit(MigrationEvent::FilesFound {
            count: files.len(),
            directory: dir.to_path_buf(),
        });

        self.enter(RunPhase::Verifying);
        let db = self.db.as_ref();
        self.store.ensure_schema(db).await?;
        let history = self.store.read_all(db).await?;
        self.emit(MigrationEvent::HistoryFound {
            count: history.len(),
        });
        check_history(&files, &history)?;

        Ok(MigrationPlan {
            directory: dir.to_path_buf(),
            files,
            history,
        })
    }

    /// Apply every pending file in `dir`.
    ///
    /// Either all pending files are applied and recorded, or none are.
    pub async fn migrate(&self, dir: &Path, tags: &Tags) -> SqergeResult<RunSummary> {
        let result = self.run(dir, tags).await;
        if let Err(e) = &result {
            self.enter(RunPhase::Failed);
            log::debug!("run failed: {e}");
        }
        result
    }

    /// Applied migrations, oldest first. Leaves the database untouched when
    /// nothing was ever migrated.
    pub async fn history(&self) -> SqergeResult<Vec<HistoryRecord>> {
        self.store.read_existing(self.db.as_ref()).await
    }

    async fn run(&self, dir: &Path, tags: &Tags) -> SqergeResult<RunSummary> {
        let plan = self.plan(dir).await?;
        check_tags(&plan.history, tags)?;

        for (index, file) in plan.applied().iter().enumerate() {
            self.emit(MigrationEvent::AlreadyMigrated {
                position: index + 1,
                file: file.name.clone(),
            });
        }

        let pending = plan.pending();
        self.emit(MigrationEvent::Pending {
            count: pending.len(),
        });

        let mut summary = RunSummary {
            files_found: plan.files.len(),
            already_applied: plan.history.len(),
            applied: Vec::with_capacity(pending.len()),
        };

        if pending.is_empty() {
            self.enter(RunPhase::Committed);
            self.emit(MigrationEvent::Done { applied: 0 });
            return Ok(summary);
        }

        let db = self.db.as_ref();
        db.begin().await?;

        let offset = plan.history.len();
        for (index, file) in pending.iter().enumerate() {
            let position = offset + index + 1;
            self.enter(RunPhase::Applying(position));

            if let Err(e) = self.apply_file(file, position, tags).await {
                self.emit(MigrationEvent::RollingBack {
                    position,
                    file: file.name.clone(),
                });
                if let Err(rollback_err) = db.rollback().await {
                    log::warn!("rollback after failure in {} failed: {rollback_err}", file.name);
                }
                self.enter(RunPhase::RolledBack);
                return Err(e);
            }

            self.emit(MigrationEvent::Applied {
                position,
                file: file.name.clone(),
            });
            summary.applied.push(file.name.clone());
        }

        if let Err(commit_err) = db.commit().await {
            if let Err(rollback_err) = db.rollback().await {
                log::warn!("rollback after failed commit failed: {rollback_err}");
            }
            self.enter(RunPhase::RolledBack);
            return Err(commit_err.into());
        }

        self.enter(RunPhase::Committed);
        self.emit(MigrationEvent::Done {
            applied: summary.applied.len(),
        });
        Ok(summary)
    }

    /// Record `file` in history, then run it.
    ///
    /// The history row goes first so that a prefix claimed by a concurrent
    /// run stops this file before any of its statements execute.
    async fn apply_file(&self, file: &MigrationFile, position: usize, tags: &Tags) -> SqergeResult<()> {
        let db = self.db.as_ref();
        let recorded_tags = match file.kind {
            MigrationKind::Script => Some(tags),
            MigrationKind::Query => None,
        };
        self.store
            .insert(db, file.order_key, &file.name, recorded_tags, position)
            .await?;

        let result = match file.kind {
            MigrationKind::Query => {
                let sql = std::fs::read_to_string(&file.path).map_err(|e| SqergeError::Io {
                    path: file.path.display().to_string(),
                    source: e,
                })?;
                if sql.trim().is_empty() {
                    log::debug!("{}: empty file, nothing to execute", file.name);
                    Ok(())
                } else {
                    db.execute_batch(&sql).await.map_err(SqergeError::from)
                }
            }
            MigrationKind::Script => self.scripts.execute(&file.name, db, tags).await,
        };

        result.map_err(|e| classify_failure(e, file, position))
    }

    fn enter(&self, phase: RunPhase) {
        log::debug!("phase: {phase}");
        self.reporter.phase(phase);
    }

    fn emit(&self, event: MigrationEvent) {
        self.reporter.report(&event);
    }
}

/// Turn statement-level database errors into [`SqergeError::SqlExecution`].
///
/// Connection and driver-state errors keep their own identity so callers
/// can tell an unreachable database from a broken migration.
fn classify_failure(err: SqergeError, file: &MigrationFile, position: usize) -> SqergeError {
    match err {
        SqergeError::Database(
            e @ (DbError::ExecutionError(_)
            | DbError::TableNotFound(_)
            | DbError::UniqueViolation { .. }),
        ) => SqergeError::SqlExecution {
            file: file.name.clone(),
            position,
            message: e.to_string(),
        },
        other => other,
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
