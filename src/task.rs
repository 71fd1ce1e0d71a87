//! Task data structure and related functionality.
//!
//! This module defines the `Task` struct, a single work item attached to one project,
//! with its workflow status, priority, scheduling and effort tracking fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::fields::*;

/// A work item belonging to exactly one project.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub project_id: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a to-do task with medium priority and no schedule.
    pub fn new(id: &str, title: &str, project_id: &str) -> Self {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            project_id: project_id.to_string(),
            assignee_id: None,
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// A task is overdue when its due date is strictly before `now` and it is not done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_done() && self.due_date.is_some_and(|due| due < now)
    }

    /// Check the effort fields for negative or NaN values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let hours = [
            ("estimated_hours", self.estimated_hours),
            ("actual_hours", self.actual_hours),
        ];
        for (field, value) in hours {
            if let Some(v) = value {
                if !(v >= 0.0) {
                    return Err(ValidationError::NegativeQuantity {
                        id: self.id.clone(),
                        field,
                        value: v,
                    });
                }
            }
        }
        Ok(())
    }
}
