//! Session history records.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::telemetry::LogRecord;

/// One assistant session for a project.
///
/// Open while `ended_at` is `None`; closed records are never modified again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub project: String,
    /// Canonical absolute project path, used to match stop events.
    pub project_path: String,
    #[serde(with = "crate::timestamp")]
    pub started_at: DateTime<Local>,
    #[serde(default, with = "crate::timestamp::option")]
    pub ended_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub baseline_tokens: u64,
    #[serde(default)]
    pub final_tokens: Option<u64>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
}

impl SessionRecord {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

impl LogRecord for SessionRecord {
    const COLLECTION: &'static str = "sessions";
}

/// Result of a stop event.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Stopped(SessionRecord),
    NoOpenSession,
}
