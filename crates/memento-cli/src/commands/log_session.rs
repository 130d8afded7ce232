//! Session lifecycle logging, driven by session start/stop hooks.

use anyhow::Result;
use clap::{Args, ValueEnum};
use memento_core::{
    AnalyzerBaseline, BaselineProvider, SessionReconciler, StopOutcome, SubprocessBaseline,
};
use serde_json::json;
use std::time::Duration;

use super::analyze::project_analyzer;
use super::AppContext;
use crate::output;

#[derive(Args)]
pub struct LogSessionArgs {
    /// Session event type
    #[arg(short, long, value_enum)]
    pub event: SessionEvent,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SessionEvent {
    Start,
    Stop,
}

fn baseline_provider(ctx: &AppContext) -> Box<dyn BaselineProvider> {
    let settings = &ctx.settings.sessions;
    match SubprocessBaseline::from_command_line(&settings.baseline_command) {
        Some(provider) => Box::new(
            provider.with_timeout(Duration::from_secs(settings.baseline_timeout_secs)),
        ),
        None => Box::new(AnalyzerBaseline::new(project_analyzer(ctx, false))),
    }
}

pub fn execute(args: LogSessionArgs, ctx: &AppContext) -> Result<()> {
    let reconciler =
        SessionReconciler::at(&ctx.paths, &ctx.settings.sessions, baseline_provider(ctx));

    let status = match args.event {
        SessionEvent::Start => {
            let record = reconciler.start(&ctx.project_dir)?;
            json!({ "status": "started", "session_id": record.id })
        }
        SessionEvent::Stop => match reconciler.stop(&ctx.project_dir)? {
            StopOutcome::Stopped(record) => json!({ "status": "stopped", "session_id": record.id }),
            StopOutcome::NoOpenSession => json!({ "status": "no_open_session" }),
        },
    };

    if !args.quiet {
        output::print_status(&status)?;
    }
    Ok(())
}
