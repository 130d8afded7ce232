//! Command usage logging.

pub mod model;

use chrono::{DateTime, Local};
use std::path::Path;

use crate::config::{CommandSettings, StoragePaths, DEFAULT_MAX_COMMAND_CHARS};
use crate::error::MementoResult;
use crate::telemetry::TelemetryStore;
use model::CommandLogEntry;

/// Records executed commands into the bounded command history.
pub struct CommandLogger {
    store: TelemetryStore<CommandLogEntry>,
    max_command_chars: usize,
}

impl CommandLogger {
    pub fn new(store: TelemetryStore<CommandLogEntry>) -> Self {
        Self {
            store,
            max_command_chars: DEFAULT_MAX_COMMAND_CHARS,
        }
    }

    /// Logger over the configured command history location and limits.
    pub fn at(paths: &StoragePaths, settings: &CommandSettings) -> Self {
        Self::new(TelemetryStore::new(paths.commands_file.clone(), settings.retention))
            .with_max_command_chars(settings.max_command_chars)
    }

    pub fn with_max_command_chars(mut self, max: usize) -> Self {
        self.max_command_chars = max;
        self
    }

    pub fn store(&self) -> &TelemetryStore<CommandLogEntry> {
        &self.store
    }

    /// Log a command execution for a project.
    pub fn log(&self, tool_input: &str, project: &Path) -> MementoResult<CommandLogEntry> {
        self.log_at(tool_input, project, Local::now())
    }

    pub fn log_at(
        &self,
        tool_input: &str,
        project: &Path,
        now: DateTime<Local>,
    ) -> MementoResult<CommandLogEntry> {
        let entry = CommandLogEntry {
            command: truncate_chars(&extract_command(tool_input), self.max_command_chars),
            project: project_name(project),
            timestamp: now,
        };

        self.store.append(entry.clone())?;
        tracing::debug!(project = %entry.project, "Logged command");
        Ok(entry)
    }
}

/// Pull the command out of a hook payload.
///
/// Input starting with `{` is parsed as JSON and its `command` field used.
/// Anything else, or JSON without a string `command`, is taken verbatim.
pub fn extract_command(tool_input: &str) -> String {
    if tool_input.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(tool_input) {
            if let Some(command) = value.get("command").and_then(|c| c.as_str()) {
                return command.to_string();
            }
        }
    }
    tool_input.to_string()
}

/// Basename of the project path, or the path itself when it has none.
pub fn project_name(project: &Path) -> String {
    project
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| project.display().to_string())
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logger(dir: &TempDir) -> CommandLogger {
        CommandLogger::at(&StoragePaths::under(dir.path()), &CommandSettings::default())
    }

    #[test]
    fn test_extract_command_from_json() {
        assert_eq!(extract_command(r#"{"command": "cargo test", "timeout": 5}"#), "cargo test");
    }

    #[test]
    fn test_extract_command_verbatim() {
        assert_eq!(extract_command("ls -la"), "ls -la");
        assert_eq!(extract_command("{not json"), "{not json");
        assert_eq!(extract_command(r#"{"cmd": "x"}"#), r#"{"cmd": "x"}"#);
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name(Path::new("/home/me/work/api")), "api");
        assert_eq!(project_name(Path::new(".")), ".");
        assert_eq!(project_name(Path::new("/")), "/");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_log_truncates_long_commands() {
        let dir = TempDir::new().unwrap();
        let entry = logger(&dir).log(&"x".repeat(800), Path::new("/tmp/proj")).unwrap();
        assert_eq!(entry.command.chars().count(), 500);
        assert_eq!(entry.project, "proj");
    }

    #[test]
    fn test_log_keeps_last_entries() {
        let dir = TempDir::new().unwrap();
        let paths = StoragePaths::under(dir.path());
        let logger = CommandLogger::new(TelemetryStore::new(paths.commands_file.clone(), 3));

        for i in 0..5 {
            logger.log(&format!("echo {i}"), Path::new("/tmp/proj")).unwrap();
        }

        let commands: Vec<String> = logger
            .store()
            .load()
            .into_log()
            .records
            .into_iter()
            .map(|e| e.command)
            .collect();
        assert_eq!(commands, vec!["echo 2", "echo 3", "echo 4"]);
    }

    #[test]
    fn test_at_applies_settings() {
        let dir = TempDir::new().unwrap();
        let settings = CommandSettings {
            retention: 2,
            max_command_chars: 4,
        };
        let logger = CommandLogger::at(&StoragePaths::under(dir.path()), &settings);

        for cmd in ["git status", "git diff", "git log"] {
            logger.log(cmd, Path::new("/tmp/proj")).unwrap();
        }

        let commands: Vec<String> = logger
            .store()
            .load()
            .into_log()
            .records
            .into_iter()
            .map(|e| e.command)
            .collect();
        assert_eq!(commands, vec!["git ", "git "]);
    }

    #[test]
    fn test_persisted_document_shape() {
        let dir = TempDir::new().unwrap();
        let logger = logger(&dir);
        logger.log("git status", Path::new("/tmp/proj")).unwrap();

        let raw = std::fs::read_to_string(logger.store().path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["version"], "1.0");
        assert_eq!(doc["commands"][0]["command"], "git status");
        assert_eq!(doc["commands"][0]["project"], "proj");
        assert!(doc["commands"][0]["timestamp"].is_string());
    }
}
