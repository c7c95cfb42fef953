//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sq_core::{Config, Migrator, SqergeError};
use sq_db::{Database, DbError, DuckDbBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded configuration plus an open database handle.
pub(crate) struct CommandContext {
    pub config: Config,
    pub db: Arc<dyn Database>,
}

impl CommandContext {
    /// Load config and open the database named by `--database` or the config.
    pub(crate) fn new(global: &GlobalArgs) -> Result<Self> {
        let config = load_config(global)?;

        let db_path = global
            .database
            .as_deref()
            .unwrap_or(&config.database.path);
        log::debug!("opening database {db_path}");
        let db: Arc<dyn Database> = Arc::new(
            DuckDbBackend::new(db_path)
                .with_context(|| format!("Failed to connect to database '{db_path}'"))?,
        );

        Ok(Self { config, db })
    }

    /// Migration directory from the positional argument, else the config.
    pub(crate) fn migrations_dir(&self, dir: Option<&str>) -> PathBuf {
        match dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(&self.config.migrations_dir),
        }
    }

    /// A migrator over this context's database and history table.
    pub(crate) fn migrator(&self) -> Result<Migrator> {
        let store = self.config.history_store()?;
        Ok(Migrator::new(self.db.clone()).with_history_store(store))
    }
}

/// Load the config file given with `--config`, or look in the current
/// directory.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load configuration file '{path}'")),
        None => Config::load_from_dir(Path::new("."))
            .context("Failed to load project configuration"),
    }
}

/// Prefix for a failed command's message: database driver failures are told
/// apart from sqerge's own checks.
pub(crate) fn error_label(err: &anyhow::Error) -> &'static str {
    let from_database = err.chain().any(|cause| {
        cause.downcast_ref::<DbError>().is_some()
            || cause
                .downcast_ref::<SqergeError>()
                .is_some_and(SqergeError::is_database_error)
    });
    if from_database {
        "(database error)"
    } else {
        "(error)"
    }
}

/// Print a simple aligned table.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(h.chars().count())
        })
        .collect()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
