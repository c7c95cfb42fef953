//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// sqerge - apply ordered SQL migrations to a database
#[derive(Parser, Debug)]
#[command(name = "sqerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (DuckDB file or :memory:), overrides the config file
    #[arg(short, long, global = true, env = "SQERGE_DATABASE")]
    pub database: Option<String>,

    /// Config file path (default: sqerge.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending migration in one transaction
    Migrate(MigrateArgs),

    /// List pending migrations without applying them
    Next(NextArgs),

    /// List applied migrations
    History(HistoryArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Migration directory (default: migrations_dir from config)
    pub dir: Option<String>,

    /// Tag passed to script migrations (repeatable, or comma separated)
    #[arg(
        short = 't',
        long = "tag",
        env = "SQERGE_TAGS",
        value_delimiter = ','
    )]
    pub tags: Vec<String>,
}

/// Arguments for the next command
#[derive(Args, Debug)]
pub struct NextArgs {
    /// Migration directory (default: migrations_dir from config)
    pub dir: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
