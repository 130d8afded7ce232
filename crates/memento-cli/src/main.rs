//! Memento CLI - context token budgeting for Claude Code
//!
//! Estimates the context cost of a project's Claude Code configuration and
//! records command and session history from editor hooks.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing.
///
/// Output always goes to stderr with ANSI disabled: stdout carries the JSON
/// that hooks and scripts consume.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "memento=debug,memento_core=debug,memento_token=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute()
}
