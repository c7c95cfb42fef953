//! sq-core - Migration engine for sqerge
//!
//! Discovers ordered migration files in a directory, checks them against the
//! history table, and applies the pending ones inside a single transaction.
//! Script migrations are registered in code through [`ScriptRegistry`].

pub mod config;
pub mod consistency;
pub mod error;
pub mod event;
pub mod history;
pub mod migration_file;
pub mod migrator;
pub mod script;
pub mod tags;

pub use config::{Config, DatabaseConfig};
pub use error::{PrefixConflict, SqergeError, SqergeResult};
pub use event::{LogReporter, MigrationEvent, MigrationReporter};
pub use history::{HistoryRecord, HistoryStore, DEFAULT_HISTORY_TABLE};
pub use migration_file::{list_migration_files, MigrationFile, MigrationKind};
pub use migrator::{MigrationPlan, Migrator, RunPhase, RunSummary};
pub use script::{ScriptError, ScriptExport, ScriptMigration, ScriptRegistry, ScriptResult};
pub use tags::Tags;
