//! Team member records referenced by projects and tasks.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A team member who can own projects and be assigned tasks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "crate::dates::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
