//! Recent session and command history.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use memento_core::{CommandLogEntry, LoadOutcome, LogRecord, SessionRecord, TelemetryStore};
use serde_json::json;

use super::AppContext;
use crate::output;

#[derive(Args)]
pub struct HistoryArgs {
    /// Only show sessions
    #[arg(long, conflicts_with = "commands")]
    pub sessions: bool,

    /// Only show commands
    #[arg(long)]
    pub commands: bool,

    /// Number of most recent entries to show
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Output raw JSON
    #[arg(short, long)]
    pub json: bool,
}

pub fn execute(args: HistoryArgs, ctx: &AppContext) -> Result<()> {
    let show_sessions = !args.commands;
    let show_commands = !args.sessions;

    let sessions: TelemetryStore<SessionRecord> =
        TelemetryStore::new(ctx.paths.sessions_file.clone(), ctx.settings.sessions.retention);
    let commands: TelemetryStore<CommandLogEntry> =
        TelemetryStore::new(ctx.paths.commands_file.clone(), ctx.settings.commands.retention);

    let sessions = show_sessions.then(|| recent(sessions.load(), args.limit));
    let commands = show_commands.then(|| recent(commands.load(), args.limit));

    if args.json {
        let mut doc = serde_json::Map::new();
        if let Some(sessions) = &sessions {
            doc.insert(SessionRecord::COLLECTION.into(), json!(sessions));
        }
        if let Some(commands) = &commands {
            doc.insert(CommandLogEntry::COLLECTION.into(), json!(commands));
        }
        return output::print_json(&doc);
    }

    if let Some(sessions) = &sessions {
        output::print_sessions_table(sessions);
    }
    if let (Some(_), Some(_)) = (&sessions, &commands) {
        println!();
    }
    if let Some(commands) = &commands {
        output::print_commands_table(commands);
    }

    Ok(())
}

/// The last `limit` records, oldest first.
fn recent<T: LogRecord>(outcome: LoadOutcome<T>, limit: usize) -> Vec<T> {
    if let Some(cause) = outcome.cause() {
        eprintln!("{} {}", "warning:".yellow().bold(), cause);
    }

    let mut records = outcome.into_log().records;
    let skip = records.len().saturating_sub(limit);
    records.drain(..skip);
    records
}
