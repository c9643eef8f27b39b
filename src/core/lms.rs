use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::LmsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "course_code")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Course and assignment source (Canvas in production).
#[async_trait]
pub trait LmsClient: Send + Sync {
    async fn list_active_courses(&self) -> Result<Vec<Course>, LmsError>;

    async fn course(&self, course_id: u64) -> Result<Course, LmsError>;

    async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, LmsError>;
}

/// Ascending by due date; assignments without one go last, ties keep their
/// original order.
pub fn sort_by_due(assignments: &mut [Assignment]) {
    assignments.sort_by_key(|a| (a.due_at.is_none(), a.due_at));
}

/// Assignments due strictly after `now`, soonest first, at most `limit`.
pub fn upcoming(mut assignments: Vec<Assignment>, now: DateTime<Utc>, limit: usize) -> Vec<Assignment> {
    sort_by_due(&mut assignments);
    assignments
        .into_iter()
        .filter(|a| a.due_at.map_or(false, |due| due > now))
        .take(limit)
        .collect()
}

/// End of the "next week" window: seven days out, at 23:59:59 UTC.
pub fn next_week_end(now: DateTime<Utc>) -> DateTime<Utc> {
    let day = (now + chrono::Duration::days(7)).date_naive();
    day.and_hms_opt(23, 59, 59)
        .map(|t| t.and_utc())
        .unwrap_or(now + chrono::Duration::days(8))
}
