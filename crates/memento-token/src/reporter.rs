//! Human-readable token reports.
//!
//! Renders project and file analyses as plain text with a per-source bar
//! showing each file's share of the total.

use crate::analyzer::{FilesAnalysis, ProjectAnalysis, TokenReport};
use crate::scanner::ArtifactCategory;

const RULE_WIDTH: usize = 50;

impl ProjectAnalysis {
    /// Format the analysis as a human-readable string.
    pub fn to_display_string(&self) -> String {
        let mut output = String::new();
        let rule = "─".repeat(RULE_WIDTH);
        let total = self.totals.total_project_tokens;

        output.push_str("Context Token Report\n");
        output.push_str(&format!("{}\n", rule));
        output.push_str(&format!("Project: {}\n", self.project_root));
        if !self.exact_tokenizer {
            output.push_str("Counts are estimated (~4 bytes per token)\n");
        }
        output.push_str(&format!("{}\n", rule));

        for category in ArtifactCategory::ALL {
            output.push_str(&format!(
                "  {:<12} {:>8}\n",
                category.as_str(),
                self.totals.for_category(category)
            ));
        }
        output.push_str(&format!("  {:<12} {:>8}\n", "project", total));
        output.push_str(&format!(
            "  {:<12} {:>8}\n",
            "system", self.estimates.system_prompt_tokens
        ));
        output.push_str(&format!(
            "  {:<12} {:>8}\n",
            "baseline", self.estimates.baseline_total
        ));

        if let Some(budget) = &self.budget {
            output.push_str(&format!("{}\n", rule));
            output.push_str(&format!(
                "Budget: {} tokens, {:.1}% used, {} remaining\n",
                budget.budget, budget.budget_used_percent, budget.budget_remaining
            ));
            if budget.budget_remaining < 0 {
                output.push_str("  Baseline exceeds the budget\n");
            }
        }

        let reports = self.reports();
        if !reports.is_empty() {
            output.push_str("\nBreakdown by source:\n");

            let mut sorted = reports;
            sorted.sort_by(|a, b| b.1.token_count().cmp(&a.1.token_count()));

            for (category, report) in sorted {
                output.push_str(&source_line(report, total, Some(category)));
            }
        }

        output
    }
}

impl FilesAnalysis {
    /// Format the analysis as a human-readable string.
    pub fn to_display_string(&self) -> String {
        let mut output = String::new();

        output.push_str("Token Usage Report\n");
        output.push_str(&format!("{}\n", "─".repeat(RULE_WIDTH)));
        output.push_str(&format!("Total tokens:     {:>8}\n", self.total_tokens));
        output.push_str(&format!("Total lines:      {:>8}\n", self.total_lines));
        output.push_str(&format!("{}\n\n", "─".repeat(RULE_WIDTH)));

        for report in &self.files {
            output.push_str(&source_line(report, self.total_tokens, None));
        }

        output
    }
}

fn source_line(report: &TokenReport, total: u64, category: Option<ArtifactCategory>) -> String {
    let label = match category {
        Some(category) => format!("[{}] {}", category, short_source(&report.file)),
        None => short_source(&report.file).to_string(),
    };

    if let Some(error) = &report.error {
        return format!("  {:>6}        {} ({})\n", "-", label, error);
    }

    let tokens = report.token_count() as u64;
    let pct = if total > 0 { tokens * 100 / total } else { 0 };
    let bar = "█".repeat((pct / 2).max(1) as usize);

    format!("  {:>6} ({:>2}%) {} {}\n", tokens, pct, bar, label)
}

/// Shorten a source path for display.
fn short_source(source: &str) -> &str {
    std::path::Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ProjectAnalyzer;
    use crate::scanner::ArtifactScanner;
    use crate::tokenizer::HeuristicTokenizer;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_project_display_includes_budget() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("CLAUDE.md"), "x".repeat(160)).unwrap();

        let analyzer =
            ProjectAnalyzer::new(ArtifactScanner::new(None), Arc::new(HeuristicTokenizer));
        let text = analyzer.analyze(dir.path()).with_budget(5000).to_display_string();

        assert!(text.contains("Counts are estimated"));
        assert!(text.contains("10040"));
        assert!(text.contains("200.8% used"));
        assert!(text.contains("Baseline exceeds the budget"));
        assert!(text.contains("[claude_md] CLAUDE.md"));
    }

    #[test]
    fn test_files_display_shows_errors() {
        let analyzer =
            ProjectAnalyzer::new(ArtifactScanner::new(None), Arc::new(HeuristicTokenizer));
        let text = analyzer
            .analyze_files(&["/nonexistent/missing.md"])
            .to_display_string();

        assert!(text.contains("missing.md (File not found)"));
    }
}
