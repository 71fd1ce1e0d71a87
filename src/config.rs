//! Runtime settings resolved from CLI flags and the environment.

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::dates::parse_timestamp;
use crate::error::{Error, Result};
use crate::fields::OutputFormat;

/// Environment variable naming the snapshot file.
pub const DB_ENV: &str = "PMD_DB";

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub now: DateTime<Utc>,
    pub format: OutputFormat,
}

impl Settings {
    /// Resolve settings. `wall_clock` is only used when `--now` is absent.
    pub fn resolve(cli: &Cli, wall_clock: DateTime<Utc>) -> Result<Self> {
        let db_path = match (&cli.db, env::var(DB_ENV).ok()) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) if !path.is_empty() => PathBuf::from(path),
            _ => default_db_path(),
        };
        let now = match cli.now.as_deref() {
            Some(raw) => parse_now(raw)?,
            None => wall_clock,
        };
        Ok(Settings {
            db_path,
            now,
            format: cli.format,
        })
    }
}

/// `~/.pm/dashboard.json`, or `./.pm/dashboard.json` without a home directory.
pub fn default_db_path() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pm").join("dashboard.json")
}

/// Parse a clock override in any form snapshot timestamps accept.
pub fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(raw).ok_or_else(|| {
        Error::InvalidArgument(format!("cannot parse '{raw}' as a date or timestamp"))
    })
}

/// Build the log filter: `RUST_LOG` wins, otherwise verbosity picks the level.
pub fn log_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_now_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_now("2024-06-15").unwrap(), expected);
        assert_eq!(parse_now("2024-06-15T02:00:00+02:00").unwrap(), expected);
        assert!(matches!(parse_now("next week"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_flags_override_defaults() {
        use clap::Parser;
        let cli = Cli::parse_from([
            "pmd", "--db", "/tmp/snap.json", "--now", "2024-01-02", "projects",
        ]);
        let wall = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let settings = Settings::resolve(&cli, wall).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("/tmp/snap.json"));
        assert_eq!(settings.now, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_wall_clock_used_without_override() {
        use clap::Parser;
        let cli = Cli::parse_from(["pmd", "--db", "snap.json", "projects"]);
        let wall = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Settings::resolve(&cli, wall).unwrap().now, wall);
    }

    #[test]
    fn test_default_path_ends_with_dashboard_file() {
        assert!(default_db_path().ends_with(".pm/dashboard.json"));
    }
}
