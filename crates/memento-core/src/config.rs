//! Storage locations and settings.
//!
//! Everything lives under the user-level Claude directory (`~/.claude`):
//! - `memento-commands.json`: command history
//! - `memento-stats.json`: session history
//! - `memento.toml`: optional settings overrides

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{MementoError, MementoResult};

pub const COMMANDS_FILE_NAME: &str = "memento-commands.json";
pub const SESSIONS_FILE_NAME: &str = "memento-stats.json";
pub const SETTINGS_FILE_NAME: &str = "memento.toml";

/// Maximum number of commands kept in the history.
pub const DEFAULT_COMMAND_RETENTION: usize = 500;

/// Maximum number of sessions kept in the history.
pub const DEFAULT_SESSION_RETENTION: usize = 50;

/// Commands longer than this many characters are truncated.
pub const DEFAULT_MAX_COMMAND_CHARS: usize = 500;

/// Assumed conversational growth rate used to estimate final session tokens.
pub const DEFAULT_TOKENS_PER_MINUTE: u64 = 500;

/// Hard limit for subprocess baseline estimates.
pub const DEFAULT_BASELINE_TIMEOUT_SECS: u64 = 30;

/// Resolved on-disk locations. Built once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub claude_dir: PathBuf,
    pub commands_file: PathBuf,
    pub sessions_file: PathBuf,
    pub settings_file: PathBuf,
}

impl StoragePaths {
    /// Locations under the current user's `~/.claude`.
    pub fn resolve() -> MementoResult<Self> {
        let home = dirs::home_dir().ok_or(MementoError::HomeNotFound)?;
        Ok(Self::under(home.join(".claude")))
    }

    /// Locations under an arbitrary Claude directory.
    pub fn under(claude_dir: impl Into<PathBuf>) -> Self {
        let claude_dir = claude_dir.into();
        Self {
            commands_file: claude_dir.join(COMMANDS_FILE_NAME),
            sessions_file: claude_dir.join(SESSIONS_FILE_NAME),
            settings_file: claude_dir.join(SETTINGS_FILE_NAME),
            claude_dir,
        }
    }
}

/// User settings, all optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub commands: CommandSettings,
    pub sessions: SessionSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Assumed fixed system-prompt cost added to every baseline.
    pub system_prompt_tokens: u64,
    /// Default context-window budget for `analyze`.
    pub budget: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            system_prompt_tokens: memento_token::DEFAULT_SYSTEM_PROMPT_TOKENS,
            budget: memento_token::DEFAULT_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommandSettings {
    pub retention: usize,
    pub max_command_chars: usize,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            retention: DEFAULT_COMMAND_RETENTION,
            max_command_chars: DEFAULT_MAX_COMMAND_CHARS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    pub retention: usize,
    pub tokens_per_minute: u64,
    pub baseline_timeout_secs: u64,
    /// External command that prints a project analysis as JSON. The project
    /// path is appended as the last argument. Empty means analyze in-process.
    pub baseline_command: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            retention: DEFAULT_SESSION_RETENTION,
            tokens_per_minute: DEFAULT_TOKENS_PER_MINUTE,
            baseline_timeout_secs: DEFAULT_BASELINE_TIMEOUT_SECS,
            baseline_command: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    ///
    /// Retention caps below 1 are raised to 1.
    pub fn from_toml(content: &str) -> MementoResult<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| MementoError::Config(e.to_string()))?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        for (name, retention) in [
            ("commands.retention", &mut self.commands.retention),
            ("sessions.retention", &mut self.sessions.retention),
        ] {
            if *retention == 0 {
                tracing::warn!(setting = name, "Retention must be at least 1, using 1");
                *retention = 1;
            }
        }
        self
    }

    /// Load settings from a file.
    ///
    /// A missing file yields defaults. An unreadable or invalid file also
    /// yields defaults, with a warning.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                return Self::default();
            }
        };

        match Self::from_toml(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid settings, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_under() {
        let paths = StoragePaths::under("/tmp/claude");
        assert_eq!(paths.commands_file, PathBuf::from("/tmp/claude/memento-commands.json"));
        assert_eq!(paths.sessions_file, PathBuf::from("/tmp/claude/memento-stats.json"));
        assert_eq!(paths.settings_file, PathBuf::from("/tmp/claude/memento.toml"));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.system_prompt_tokens, 10_000);
        assert_eq!(settings.analysis.budget, 200_000);
        assert_eq!(settings.commands.retention, 500);
        assert_eq!(settings.sessions.retention, 50);
        assert_eq!(settings.sessions.tokens_per_minute, 500);
        assert_eq!(settings.sessions.baseline_timeout_secs, 30);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            "[sessions]\ntokens_per_minute = 750\n\n[analysis]\nsystem_prompt_tokens = 12000\n",
        )
        .unwrap();
        assert_eq!(settings.sessions.tokens_per_minute, 750);
        assert_eq!(settings.sessions.retention, 50);
        assert_eq!(settings.analysis.system_prompt_tokens, 12_000);
        assert_eq!(settings.analysis.budget, 200_000);
    }

    #[test]
    fn test_zero_retention_is_raised() {
        let settings =
            Settings::from_toml("[commands]\nretention = 0\n\n[sessions]\nretention = 0\n")
                .unwrap();
        assert_eq!(settings.commands.retention, 1);
        assert_eq!(settings.sessions.retention, 1);
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memento.toml");
        assert_eq!(Settings::load(&path), Settings::default());

        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }
}
