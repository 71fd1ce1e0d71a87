//! Error types shared by the snapshot loader, the analytics and the health scorer.

use std::path::PathBuf;

use thiserror::Error;

/// Structurally invalid input handed to a computation.
///
/// These are reported to the caller instead of producing a partial report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// A task was supplied for a project it does not belong to.
    #[error("task '{task_id}' belongs to project '{found}', not '{expected}'")]
    TaskProjectMismatch {
        task_id: String,
        expected: String,
        found: String,
    },
    /// The project ends before it starts.
    #[error("project '{project_id}' ends ({end}) before it starts ({start})")]
    InvalidSchedule {
        project_id: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    /// Progress is not a percentage.
    #[error("project '{project_id}' has progress {progress}, expected 0-100")]
    ProgressOutOfRange { project_id: String, progress: f64 },
    /// A quantity that must be non-negative is negative or not a number.
    #[error("{field} on '{id}' must be a non-negative number, got {value}")]
    NegativeQuantity {
        id: String,
        field: &'static str,
        value: f64,
    },
}

/// Top-level error for the `pmd` binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("snapshot file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no project found matching '{0}'")]
    UnknownProject(String),
    #[error("{0}")]
    Ambiguous(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
