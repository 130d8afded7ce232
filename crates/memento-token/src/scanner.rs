//! Discovery of Claude Code configuration artifacts.
//!
//! Looks in the project root and in the user-level `~/.claude` directory.
//! Locations that do not exist are skipped silently.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Category of a configuration artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    ClaudeMd,
    Skill,
    Command,
    Agent,
    Hook,
    McpConfig,
}

impl ArtifactCategory {
    /// All categories in scan order.
    pub const ALL: [ArtifactCategory; 6] = [
        ArtifactCategory::ClaudeMd,
        ArtifactCategory::Skill,
        ArtifactCategory::Command,
        ArtifactCategory::Agent,
        ArtifactCategory::Hook,
        ArtifactCategory::McpConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactCategory::ClaudeMd => "claude_md",
            ArtifactCategory::Skill => "skill",
            ArtifactCategory::Command => "command",
            ArtifactCategory::Agent => "agent",
            ArtifactCategory::Hook => "hook",
            ArtifactCategory::McpConfig => "mcp_config",
        }
    }
}

impl std::fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigArtifact {
    pub path: PathBuf,
    pub category: ArtifactCategory,
}

/// Artifacts found by a scan, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub artifacts: Vec<ConfigArtifact>,
}

impl ScanResult {
    /// Paths discovered for one category.
    pub fn paths(&self, category: ArtifactCategory) -> impl Iterator<Item = &Path> {
        self.artifacts
            .iter()
            .filter(move |a| a.category == category)
            .map(|a| a.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Locates configuration artifacts for a project.
#[derive(Debug, Clone, Default)]
pub struct ArtifactScanner {
    /// User-level Claude directory (normally `~/.claude`). `None` disables
    /// user-level lookups.
    user_dir: Option<PathBuf>,
}

impl ArtifactScanner {
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    /// Scan using the current user's `~/.claude` directory.
    pub fn for_current_user() -> Self {
        Self::new(dirs::home_dir().map(|home| home.join(".claude")))
    }

    /// Scan a project root.
    pub fn scan(&self, root: &Path) -> ScanResult {
        let mut collector = Collector::default();
        let project_dir = root.join(".claude");
        let user_dir = self.user_dir.as_deref();

        // CLAUDE.md: every location that exists
        let mut claude_md = vec![root.join("CLAUDE.md"), project_dir.join("CLAUDE.md")];
        claude_md.extend(user_dir.map(|d| d.join("CLAUDE.md")));
        for path in claude_md {
            if path.is_file() {
                collector.push(ArtifactCategory::ClaudeMd, path);
            }
        }

        for dir in search_dirs(&project_dir, user_dir, "skills") {
            for path in find_skill_files(&dir) {
                collector.push(ArtifactCategory::Skill, path);
            }
        }

        for dir in search_dirs(&project_dir, user_dir, "commands") {
            for path in list_markdown(&dir) {
                collector.push(ArtifactCategory::Command, path);
            }
        }

        for dir in search_dirs(&project_dir, user_dir, "agents") {
            for path in list_markdown(&dir) {
                collector.push(ArtifactCategory::Agent, path);
            }
        }

        for dir in [Some(project_dir.as_path()), user_dir].into_iter().flatten() {
            let hooks = dir.join("hooks.json");
            if hooks.is_file() {
                collector.push(ArtifactCategory::Hook, hooks);
            }
        }

        // MCP config: first match wins
        let mut mcp = vec![root.join(".mcp.json"), project_dir.join(".mcp.json")];
        mcp.extend(user_dir.map(|d| d.join(".mcp.json")));
        if let Some(path) = mcp.into_iter().find(|p| p.is_file()) {
            collector.push(ArtifactCategory::McpConfig, path);
        }

        tracing::debug!(
            root = %root.display(),
            artifacts = collector.artifacts.len(),
            "Scanned project for context artifacts"
        );

        ScanResult {
            artifacts: collector.artifacts,
        }
    }
}

/// Accumulates artifacts, dropping any path already seen.
#[derive(Default)]
struct Collector {
    seen: HashSet<PathBuf>,
    artifacts: Vec<ConfigArtifact>,
}

impl Collector {
    fn push(&mut self, category: ArtifactCategory, path: PathBuf) {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if self.seen.insert(key) {
            self.artifacts.push(ConfigArtifact { path, category });
        }
    }
}

fn search_dirs(project_dir: &Path, user_dir: Option<&Path>, name: &str) -> Vec<PathBuf> {
    let mut dirs = vec![project_dir.join(name)];
    dirs.extend(user_dir.map(|d| d.join(name)));
    dirs.into_iter().filter(|d| d.is_dir()).collect()
}

/// Every `SKILL.md` below `dir`, at any depth.
fn find_skill_files(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "SKILL.md")
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// `*.md` files directly inside `dir`.
fn list_markdown(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "md"))
        .collect();
    found.sort();
    found
}
