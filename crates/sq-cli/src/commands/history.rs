//! History command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::{print_table, CommandContext};

/// Execute the history command
pub(crate) async fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::new(global)?;
    let records = ctx.migrator()?.history().await?;

    if args.json {
        let output =
            serde_json::to_string_pretty(&records).context("Failed to serialize history")?;
        println!("{output}");
        return Ok(());
    }

    if records.is_empty() {
        println!("(0 rows)");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.order_key.to_string(),
                r.file.clone(),
                r.tags.as_ref().map(ToString::to_string).unwrap_or_default(),
                r.applied_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print_table(&["id", "prefix", "file", "tags", "applied_at"], &rows);
    Ok(())
}
