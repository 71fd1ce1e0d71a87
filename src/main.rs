//! # PMD - Project Dashboard Analytics
//!
//! Reporting over a point-in-time snapshot of projects, tasks and users: the counts
//! behind the dashboard charts and a per-project health assessment.
//!
//! ## Key Features
//!
//! - **Aggregates**: projects by status and creation month, tasks by status, priority
//!   and month, overdue counts, open work per assignee
//! - **Project Health**: a label (Excellent, Good, At Risk, Critical) with risk factors,
//!   recommendations and a completion forecast
//! - **Reproducible**: pass `--now` to evaluate a snapshot as of any moment
//! - **Scriptable**: `--format json` emits the same records the dashboard API serves
//!
//! ## Quick Start
//!
//! ```bash
//! # Task counts for the whole snapshot
//! pmd analytics tasks
//!
//! # Health of one project as of a fixed date
//! pmd insights "Website relaunch" --now 2024-06-15
//!
//! # Machine-readable project summary
//! pmd analytics projects --format json
//! ```
//!
//! The snapshot is a JSON document with `users`, `projects` and `tasks` arrays, read
//! from `--db`, `$PMD_DB`, or `~/.pm/dashboard.json`.

use chrono::Utc;
use clap::Parser;

pub mod analytics;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod health;
pub mod project;
pub mod task;
pub mod user;

use cli::Cli;
use cmd::*;
use config::{log_filter, Settings};
use db::Database;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    // Completions don't need a snapshot
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let settings = Settings::resolve(&cli, Utc::now())?;
    let db = Database::load(&settings.db_path)?;

    match cli.command {
        Commands::Analytics { target } => match target {
            AnalyticsTarget::Projects => cmd_analytics_projects(&db, &settings),
            AnalyticsTarget::Tasks { project } => cmd_analytics_tasks(&db, &settings, project),
        },

        Commands::Insights { project } => cmd_insights(&db, &settings, project),

        Commands::Projects => cmd_projects(&db, &settings),

        Commands::Workload { project } => cmd_workload(&db, &settings, project),

        Commands::Completions { .. } => unreachable!("completions handled before loading"),
    }
}
