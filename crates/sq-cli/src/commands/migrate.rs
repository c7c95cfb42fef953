//! Migrate command implementation

use anyhow::Result;
use sq_core::{MigrationEvent, MigrationReporter, Tags};
use std::sync::Arc;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::CommandContext;

/// Prints run progress to stdout.
struct ConsoleReporter {
    verbose: bool,
}

impl MigrationReporter for ConsoleReporter {
    fn report(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::AlreadyMigrated { .. } if !self.verbose => {}
            MigrationEvent::RollingBack { .. } => eprintln!("{event}"),
            _ => println!("{event}"),
        }
    }
}

/// Execute the migrate command
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let dir = ctx.migrations_dir(args.dir.as_deref());
    let tags = run_tags(&ctx.config.tags()?, &args.tags)?;
    if !tags.is_empty() {
        log::debug!("tags: {tags}");
    }

    let migrator = ctx.migrator()?.with_reporter(Arc::new(ConsoleReporter {
        verbose: global.verbose,
    }));
    let summary = migrator.migrate(&dir, &tags).await?;

    log::debug!(
        "{} file(s) found, {} already applied, {} applied now",
        summary.files_found,
        summary.already_applied,
        summary.newly_applied()
    );
    Ok(())
}

/// Config tags merged with the ones given on the command line.
fn run_tags(config_tags: &Tags, cli_tags: &[String]) -> Result<Tags> {
    let cli_tags = Tags::try_from_iter(
        cli_tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty()),
    )?;
    Ok(config_tags.merged(&cli_tags))
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
