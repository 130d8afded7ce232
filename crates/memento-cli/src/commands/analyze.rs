//! Context token analysis command.

use anyhow::Result;
use clap::Args;
use memento_token::{select_tokenizer, ArtifactScanner, ProjectAnalyzer};
use std::path::PathBuf;

use super::AppContext;
use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Specific files to analyze (omit to analyze the project context)
    pub files: Vec<PathBuf>,

    /// Context window budget in tokens [default: 200000]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub budget: Option<u64>,

    /// Output JSON (the default)
    #[arg(short, long, conflicts_with = "text")]
    pub json: bool,

    /// Output a human-readable report instead of JSON
    #[arg(short, long)]
    pub text: bool,

    /// Use the byte-length estimate instead of the exact tokenizer
    #[arg(long)]
    pub estimate: bool,
}

/// Build the analyzer used for project snapshots.
pub fn project_analyzer(ctx: &AppContext, force_estimate: bool) -> ProjectAnalyzer {
    let scanner = ArtifactScanner::new(Some(ctx.paths.claude_dir.clone()));
    ProjectAnalyzer::new(scanner, select_tokenizer(force_estimate))
        .with_system_prompt_tokens(ctx.settings.analysis.system_prompt_tokens)
}

pub fn execute(args: AnalyzeArgs, ctx: &AppContext) -> Result<()> {
    let analyzer = project_analyzer(ctx, args.estimate);
    let text = args.text && !args.json;

    if !args.files.is_empty() {
        let result = analyzer.analyze_files(&args.files);
        if text {
            print!("{}", result.to_display_string());
        } else {
            output::print_json(&result)?;
        }
        return Ok(());
    }

    let budget = args.budget.unwrap_or(ctx.settings.analysis.budget);
    let analysis = analyzer.analyze(&ctx.project_dir).with_budget(budget);

    if text {
        output::print_project_analysis(&analysis);
    } else {
        output::print_json(&analysis)?;
    }

    Ok(())
}
