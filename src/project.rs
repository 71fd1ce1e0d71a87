//! Project data structure.
//!
//! A project groups tasks under an owner and an optional schedule. Its `progress`
//! field is maintained by whoever writes the snapshot and is taken as an input here;
//! the health scorer compares it against the task completion ratio but never
//! rewrites it.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::fields::ProjectStatus;

/// A project with its schedule, ownership and team.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    /// Percent complete, 0-100.
    #[serde(default)]
    pub progress: f64,
    #[serde(default, deserialize_with = "crate::dates::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::dates::opt_date")]
    pub end_date: Option<NaiveDate>,
    pub owner_id: String,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub team_members: BTreeSet<String>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a project in the planning state with no schedule.
    pub fn new(id: &str, name: &str, owner_id: &str) -> Self {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            status: ProjectStatus::default(),
            progress: 0.0,
            start_date: None,
            end_date: None,
            owner_id: owner_id.to_string(),
            budget: None,
            team_members: BTreeSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Number of days between start and end, when both are set.
    pub fn planned_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Check the fields whose values the scorer relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=100.0).contains(&self.progress) {
            return Err(ValidationError::ProgressOutOfRange {
                project_id: self.id.clone(),
                progress: self.progress,
            });
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::InvalidSchedule {
                    project_id: self.id.clone(),
                    start,
                    end,
                });
            }
        }
        if let Some(budget) = self.budget {
            if !(budget >= 0.0) {
                return Err(ValidationError::NegativeQuantity {
                    id: self.id.clone(),
                    field: "budget",
                    value: budget,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Project::new("p1", "Website", "u1").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_schedule() {
        let mut p = Project::new("p1", "Website", "u1");
        p.start_date = Some(date(2024, 5, 1));
        p.end_date = Some(date(2024, 4, 1));
        assert!(matches!(p.validate(), Err(ValidationError::InvalidSchedule { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_progress_and_budget() {
        let mut p = Project::new("p1", "Website", "u1");
        p.progress = 140.0;
        assert!(matches!(p.validate(), Err(ValidationError::ProgressOutOfRange { .. })));

        p.progress = f64::NAN;
        assert!(p.validate().is_err());

        p.progress = 10.0;
        p.budget = Some(-5.0);
        assert!(matches!(
            p.validate(),
            Err(ValidationError::NegativeQuantity { field: "budget", .. })
        ));
    }

    #[test]
    fn test_planned_days() {
        let mut p = Project::new("p1", "Website", "u1");
        assert_eq!(p.planned_days(), None);
        p.start_date = Some(date(2024, 1, 1));
        p.end_date = Some(date(2024, 1, 31));
        assert_eq!(p.planned_days(), Some(30));
    }

    #[test]
    fn test_deserialize_minimal_document() {
        let p: Project = serde_json::from_str(
            r#"{"id":"p1","name":"Website","owner_id":"u1","start_date":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(p.status, ProjectStatus::Planning);
        assert_eq!(p.start_date, Some(date(2024, 1, 1)));
        assert!(p.team_members.is_empty());
    }
}
