use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::OutputFormat;

/// Analytics and health reports over a project/task snapshot.
/// The snapshot defaults to ~/.pm/dashboard.json, $PMD_DB, or a path passed via --db.
#[derive(Parser)]
#[command(name = "pmd", version, about = "Project dashboard analytics CLI")]
pub struct Cli {
    /// Path to the JSON snapshot file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Evaluate as of this time (RFC 3339 or YYYY-MM-DD) instead of now.
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
