//! Snapshot loading and display helpers.
//!
//! This module provides the `Database` struct, a read-only point-in-time snapshot of
//! users, projects and tasks loaded from a JSON document, along with lookup helpers
//! and the table formatting shared by the text output of each command.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::project::Project;
use crate::task::Task;
use crate::user::User;

/// In-memory snapshot of everything the reports are computed from.
#[derive(Debug, Default, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Database {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let db: Database = serde_json::from_str(&buf)
            .map_err(|source| Error::Parse { path: path.to_path_buf(), source })?;
        info!(
            path = %path.display(),
            users = db.users.len(),
            projects = db.projects.len(),
            tasks = db.tasks.len(),
            "loaded snapshot"
        );
        Ok(db)
    }

    /// Get a project by ID.
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Tasks that reference the given project, cloned in snapshot order.
    pub fn tasks_for(&self, project_id: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect()
    }

    /// Get a user's display name, falling back to the raw ID.
    pub fn user_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.as_str())
            .unwrap_or(id)
    }

    /// Resolve a project identifier (either ID or name) to a project.
    /// Returns an error if the name has multiple matches and suggests using the ID instead.
    pub fn resolve_project(&self, identifier: &str) -> Result<&Project> {
        if let Some(p) = self.project(identifier) {
            return Ok(p);
        }

        let matches: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase() == identifier.to_lowercase())
            .collect();

        match matches.len() {
            0 => Err(Error::UnknownProject(identifier.to_string())),
            1 => Ok(matches[0]),
            _ => {
                let mut msg = format!("Multiple projects found with name '{}':\n", identifier);
                for p in matches {
                    msg.push_str(&format!("  ID {}: {}\n", p.id, p.name));
                }
                msg.push_str("Please use the specific ID instead.");
                Err(Error::Ambiguous(msg))
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print a two-column count table under a heading.
pub fn print_counts<K, I>(heading: &str, rows: I)
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, usize)>,
{
    println!("{:<16} {}", heading, "Count");
    for (key, count) in rows {
        println!("{:<16} {}", truncate(key.as_ref(), 16), count);
    }
}
