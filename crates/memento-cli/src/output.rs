//! Terminal output formatting.

use anyhow::Result;
use colored::Colorize;
use memento_core::{CommandLogEntry, SessionRecord};
use memento_token::ProjectAnalysis;
use serde::Serialize;

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a single-line JSON status for hook consumers.
pub fn print_status<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print a project analysis with the baseline and budget highlighted.
pub fn print_project_analysis(analysis: &ProjectAnalysis) {
    print!("{}", analysis.to_display_string());

    if let Some(budget) = &analysis.budget {
        let summary = format!("{:.1}% of budget used", budget.budget_used_percent);
        let colored_summary = if budget.budget_remaining < 0 {
            summary.red().bold()
        } else if budget.budget_used_percent >= 50.0 {
            summary.yellow()
        } else {
            summary.green()
        };
        println!();
        println!("  {}", colored_summary);
    }
}

/// Print sessions as a table.
pub fn print_sessions_table(sessions: &[SessionRecord]) {
    println!("{}", "Sessions".bold());
    if sessions.is_empty() {
        println!("{}", "  No sessions recorded.".dimmed());
        return;
    }

    println!(
        "  {:<10} {:<20} {:<17} {:>9} {:>10} {:>10}",
        "ID", "Project", "Started", "Minutes", "Baseline", "Final"
    );
    println!("  {}", "─".repeat(81));

    for session in sessions {
        let minutes = match session.duration_minutes {
            Some(m) => format!("{:.1}", m),
            None => "open".to_string(),
        };
        let final_tokens = session
            .final_tokens
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<10} {:<20} {:<17} {:>9} {:>10} {:>10}",
            session.id,
            truncate(&session.project, 20),
            session.started_at.format("%Y-%m-%d %H:%M").to_string(),
            if session.is_open() { minutes.yellow() } else { minutes.normal() },
            session.baseline_tokens,
            final_tokens
        );
    }
}

/// Print commands as a table.
pub fn print_commands_table(commands: &[CommandLogEntry]) {
    println!("{}", "Commands".bold());
    if commands.is_empty() {
        println!("{}", "  No commands recorded.".dimmed());
        return;
    }

    for entry in commands {
        println!(
            "  {} {:<20} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            truncate(&entry.project, 20),
            truncate(&entry.command, 60).cyan()
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
