//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memento_core::{Settings, StoragePaths};
use std::path::PathBuf;

pub mod analyze;
pub mod history;
pub mod log_command;
pub mod log_session;

/// Memento - context token budgeting for Claude Code
#[derive(Parser)]
#[command(name = "memento")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the context tokens of project configuration or specific files
    Analyze(analyze::AnalyzeArgs),

    /// Record an executed command in the command history
    LogCommand(log_command::LogCommandArgs),

    /// Record a session start or stop event
    LogSession(log_session::LogSessionArgs),

    /// Show recent sessions and commands
    History(history::HistoryArgs),
}

/// Resolved locations and settings shared by every command.
pub struct AppContext {
    pub project_dir: PathBuf,
    pub paths: StoragePaths,
    pub settings: Settings,
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let project_dir = match self.project {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let paths = StoragePaths::resolve()?;
        let settings = Settings::load(&paths.settings_file);

        let ctx = AppContext {
            project_dir,
            paths,
            settings,
        };

        match self.command {
            Commands::Analyze(args) => analyze::execute(args, &ctx),
            Commands::LogCommand(args) => log_command::execute(args, &ctx),
            Commands::LogSession(args) => log_session::execute(args, &ctx),
            Commands::History(args) => history::execute(args, &ctx),
        }
    }
}
