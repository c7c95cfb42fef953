//! Next command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, NextArgs};
use crate::commands::common::{print_table, CommandContext};

/// Execute the next command
pub(crate) async fn execute(args: &NextArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let dir = ctx.migrations_dir(args.dir.as_deref());
    let plan = ctx.migrator()?.plan(&dir).await?;
    let pending = plan.pending();

    if args.json {
        let output =
            serde_json::to_string_pretty(pending).context("Failed to serialize pending files")?;
        println!("{output}");
        return Ok(());
    }

    if pending.is_empty() {
        println!("Nothing to migrate ({} file(s) applied)", plan.applied().len());
        return Ok(());
    }

    let offset = plan.applied().len();
    let rows: Vec<Vec<String>> = pending
        .iter()
        .enumerate()
        .map(|(i, file)| {
            vec![
                (offset + i + 1).to_string(),
                file.order_key.to_string(),
                file.name.clone(),
                file.kind.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "prefix", "file", "kind"], &rows);
    println!("\n{} pending file(s)", pending.len());
    Ok(())
}
