//! Token analysis of configuration artifacts.
//!
//! Reads each discovered file, counts its tokens and rolls the results up into
//! per-category totals plus a fixed system-prompt overhead.

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scanner::{ArtifactCategory, ArtifactScanner};
use crate::tokenizer::Tokenizer;

/// Assumed cost of the built-in system prompt, independent of the project.
pub const DEFAULT_SYSTEM_PROMPT_TOKENS: u64 = 10_000;

/// Default context-window budget.
pub const DEFAULT_BUDGET: u64 = 200_000;

/// Token analysis of a single file.
///
/// A located file carries either `tokens` or `error`, never both.
#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    pub file: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_per_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenReport {
    fn failed(file: String, exists: bool, error: impl Into<String>) -> Self {
        Self {
            file,
            exists,
            tokens: None,
            lines: None,
            bytes: None,
            tokens_per_line: None,
            estimated: None,
            error: Some(error.into()),
        }
    }

    /// Tokens contributed to totals; errored files contribute zero.
    pub fn token_count(&self) -> usize {
        self.tokens.unwrap_or(0)
    }
}

/// Analyze a file and count its tokens.
///
/// Never fails: missing, binary and unreadable files are reported through
/// the `error` field.
pub fn analyze_file(path: &Path, tokenizer: &dyn Tokenizer) -> TokenReport {
    let file = path.display().to_string();

    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return TokenReport::failed(file, false, "File not found");
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Failed to read artifact");
            return TokenReport::failed(file, true, e.to_string());
        }
    };

    let content = match String::from_utf8(raw) {
        Ok(content) => content,
        Err(_) => return TokenReport::failed(file, true, "binary or undecodable"),
    };

    let tokens = tokenizer.count(&content);
    let lines = content.lines().count();

    TokenReport {
        file,
        exists: true,
        tokens: Some(tokens),
        lines: Some(lines),
        bytes: Some(content.len()),
        tokens_per_line: Some(round1(tokens as f64 / lines.max(1) as f64)),
        estimated: Some(!tokenizer.is_exact()),
        error: None,
    }
}

/// Reports grouped by category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Components {
    pub claude_md: Vec<TokenReport>,
    pub skills: Vec<TokenReport>,
    pub commands: Vec<TokenReport>,
    pub agents: Vec<TokenReport>,
    pub hooks: Vec<TokenReport>,
    pub mcp: Option<TokenReport>,
}

/// Per-category token subtotals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub claude_md_tokens: u64,
    pub skills_tokens: u64,
    pub commands_tokens: u64,
    pub agents_tokens: u64,
    pub hooks_tokens: u64,
    pub mcp_tokens: u64,
    pub total_project_tokens: u64,
}

impl Totals {
    pub fn for_category(&self, category: ArtifactCategory) -> u64 {
        match category {
            ArtifactCategory::ClaudeMd => self.claude_md_tokens,
            ArtifactCategory::Skill => self.skills_tokens,
            ArtifactCategory::Command => self.commands_tokens,
            ArtifactCategory::Agent => self.agents_tokens,
            ArtifactCategory::Hook => self.hooks_tokens,
            ArtifactCategory::McpConfig => self.mcp_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimates {
    pub system_prompt_tokens: u64,
    pub baseline_total: u64,
}

/// Usage of a context-window budget. `remaining` goes negative when over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub budget: u64,
    pub budget_remaining: i64,
    pub budget_used_percent: f64,
}

impl BudgetUsage {
    pub fn new(budget: u64, baseline_total: u64) -> Self {
        let budget_used_percent = if budget == 0 {
            0.0
        } else {
            round1(baseline_total as f64 / budget as f64 * 100.0)
        };

        Self {
            budget,
            budget_remaining: budget as i64 - baseline_total as i64,
            budget_used_percent,
        }
    }
}

/// Full context analysis of a project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalysis {
    pub project_root: String,
    pub exact_tokenizer: bool,
    pub components: Components,
    pub totals: Totals,
    pub estimates: Estimates,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetUsage>,
}

impl ProjectAnalysis {
    /// Attach budget figures computed from the baseline total.
    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(BudgetUsage::new(budget, self.estimates.baseline_total));
        self
    }

    pub fn baseline_total(&self) -> u64 {
        self.estimates.baseline_total
    }

    /// Every report, in category order.
    pub fn reports(&self) -> Vec<(ArtifactCategory, &TokenReport)> {
        let c = &self.components;
        let groups: [(ArtifactCategory, &[TokenReport]); 6] = [
            (ArtifactCategory::ClaudeMd, c.claude_md.as_slice()),
            (ArtifactCategory::Skill, c.skills.as_slice()),
            (ArtifactCategory::Command, c.commands.as_slice()),
            (ArtifactCategory::Agent, c.agents.as_slice()),
            (ArtifactCategory::Hook, c.hooks.as_slice()),
            (ArtifactCategory::McpConfig, c.mcp.as_slice()),
        ];

        groups
            .into_iter()
            .flat_map(|(category, reports)| reports.iter().map(move |r| (category, r)))
            .collect()
    }
}

/// Analysis of an explicit list of files.
#[derive(Debug, Clone, Serialize)]
pub struct FilesAnalysis {
    pub files: Vec<TokenReport>,
    pub total_tokens: u64,
    pub total_lines: u64,
    pub exact_tokenizer: bool,
}

/// Discovers artifacts and aggregates their token cost.
pub struct ProjectAnalyzer {
    scanner: ArtifactScanner,
    tokenizer: Arc<dyn Tokenizer>,
    system_prompt_tokens: u64,
}

impl ProjectAnalyzer {
    pub fn new(scanner: ArtifactScanner, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            scanner,
            tokenizer,
            system_prompt_tokens: DEFAULT_SYSTEM_PROMPT_TOKENS,
        }
    }

    /// Override the assumed system-prompt overhead.
    pub fn with_system_prompt_tokens(mut self, tokens: u64) -> Self {
        self.system_prompt_tokens = tokens;
        self
    }

    /// Analyze all context artifacts of a project.
    pub fn analyze(&self, root: &Path) -> ProjectAnalysis {
        let root: PathBuf = root
            .canonicalize()
            .or_else(|_| std::path::absolute(root))
            .unwrap_or_else(|_| root.to_path_buf());

        let scan = self.scanner.scan(&root);
        let tokenizer = self.tokenizer.as_ref();
        let mut components = Components::default();
        let mut totals = Totals::default();

        for artifact in &scan.artifacts {
            let report = analyze_file(&artifact.path, tokenizer);
            let tokens = report.token_count() as u64;

            match artifact.category {
                ArtifactCategory::ClaudeMd => {
                    totals.claude_md_tokens += tokens;
                    components.claude_md.push(report);
                }
                ArtifactCategory::Skill => {
                    totals.skills_tokens += tokens;
                    components.skills.push(report);
                }
                ArtifactCategory::Command => {
                    totals.commands_tokens += tokens;
                    components.commands.push(report);
                }
                ArtifactCategory::Agent => {
                    totals.agents_tokens += tokens;
                    components.agents.push(report);
                }
                ArtifactCategory::Hook => {
                    totals.hooks_tokens += tokens;
                    components.hooks.push(report);
                }
                ArtifactCategory::McpConfig => {
                    totals.mcp_tokens = tokens;
                    components.mcp = Some(report);
                }
            }
        }

        totals.total_project_tokens = totals.claude_md_tokens
            + totals.skills_tokens
            + totals.commands_tokens
            + totals.agents_tokens
            + totals.hooks_tokens
            + totals.mcp_tokens;

        let estimates = Estimates {
            system_prompt_tokens: self.system_prompt_tokens,
            baseline_total: self.system_prompt_tokens + totals.total_project_tokens,
        };

        tracing::debug!(
            root = %root.display(),
            files = scan.len(),
            baseline_total = estimates.baseline_total,
            "Project analysis complete"
        );

        ProjectAnalysis {
            project_root: root.display().to_string(),
            exact_tokenizer: tokenizer.is_exact(),
            components,
            totals,
            estimates,
            budget: None,
        }
    }

    /// Analyze explicit files without discovery or budgeting.
    pub fn analyze_files<P: AsRef<Path>>(&self, paths: &[P]) -> FilesAnalysis {
        let tokenizer = self.tokenizer.as_ref();
        let files: Vec<TokenReport> = paths
            .iter()
            .map(|p| analyze_file(&expand_home(p.as_ref()), tokenizer))
            .collect();

        FilesAnalysis {
            total_tokens: files.iter().map(|f| f.token_count() as u64).sum(),
            total_lines: files.iter().filter_map(|f| f.lines).map(|l| l as u64).sum(),
            exact_tokenizer: tokenizer.is_exact(),
            files,
        }
    }
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    expand_home_in(path, dirs::home_dir().as_deref())
}

fn expand_home_in(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
