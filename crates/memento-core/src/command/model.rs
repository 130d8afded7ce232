//! Command history records.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::telemetry::LogRecord;

/// One executed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLogEntry {
    pub command: String,
    pub project: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Local>,
}

impl LogRecord for CommandLogEntry {
    const COLLECTION: &'static str = "commands";
}
