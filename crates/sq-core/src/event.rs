//! Progress events emitted while a run moves through its phases.
//!
//! Events are advisory; nothing depends on their text.

use crate::migrator::RunPhase;
use std::fmt;
use std::path::PathBuf;

/// Something observable happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    FilesFound { count: usize, directory: PathBuf },
    HistoryFound { count: usize },
    /// A file already recorded in history (1-based position among all files)
    AlreadyMigrated { position: usize, file: String },
    Pending { count: usize },
    /// A pending file ran and was recorded (1-based position among all files)
    Applied { position: usize, file: String },
    /// The run's transaction is being rolled back because of `file`
    RollingBack { position: usize, file: String },
    Done { applied: usize },
}

impl fmt::Display for MigrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationEvent::FilesFound { count, directory } => {
                write!(f, "{count} file(s) found in {}", directory.display())
            }
            MigrationEvent::HistoryFound { count } => {
                write!(f, "{count} file(s) previously migrated")
            }
            MigrationEvent::AlreadyMigrated { position, file } => {
                write!(f, "file {position} ({file}): already migrated")
            }
            MigrationEvent::Pending { count } => write!(f, "{count} new file(s) to migrate"),
            MigrationEvent::Applied { position, file } => {
                write!(f, "file {position} ({file}): executed")
            }
            MigrationEvent::RollingBack { position, file } => {
                write!(f, "file {position} ({file}) failed, rollback...")
            }
            MigrationEvent::Done { applied } => write!(f, "done! {applied} file(s) migrated"),
        }
    }
}

/// Receives [`MigrationEvent`]s.
pub trait MigrationReporter: Send + Sync {
    fn report(&self, event: &MigrationEvent);

    /// Called on every phase transition of a run.
    fn phase(&self, _phase: RunPhase) {}
}

/// Writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl MigrationReporter for LogReporter {
    fn report(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::RollingBack { .. } => log::warn!("{event}"),
            MigrationEvent::AlreadyMigrated { .. } => log::debug!("{event}"),
            _ => log::info!("{event}"),
        }
    }
}
