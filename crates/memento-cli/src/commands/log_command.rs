//! Command history logging, driven by a Bash tool hook.

use anyhow::Result;
use clap::Args;
use memento_core::CommandLogger;
use serde_json::json;

use super::AppContext;
use crate::output;

#[derive(Args)]
pub struct LogCommandArgs {
    /// Command that was executed, raw or as a JSON tool input with a `command` field
    #[arg(short = 'i', long, default_value = "")]
    pub tool_input: String,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn execute(args: LogCommandArgs, ctx: &AppContext) -> Result<()> {
    if args.tool_input.is_empty() {
        tracing::debug!("No tool input, nothing to log");
        return Ok(());
    }

    let logger = CommandLogger::at(&ctx.paths, &ctx.settings.commands);

    logger.log(&args.tool_input, &ctx.project_dir)?;

    if !args.quiet {
        output::print_status(&json!({ "status": "logged" }))?;
    }
    Ok(())
}
