//! # Process Operations
//!
//! Runs the command interpreter and the git client through the shared [`ProcessRunner`].
//!
//! [`ProcessRunner`]: crate::infrastructure::tools::executor::ProcessRunner

use std::path::PathBuf;

use serde_json::Value;

use crate::application::args::Args;
use crate::application::dispatcher::ToolContext;
use crate::domain::error::ToolError;
use crate::domain::types::RunRequest;

/// Checks an optional `working_directory` argument against the allow-list.
async fn working_dir(ctx: &ToolContext, args: &Args<'_>) -> Result<Option<PathBuf>, ToolError> {
    let Some(raw) = args.opt_str("working_directory")? else {
        return Ok(None);
    };
    let shown = std::path::Path::new(raw);
    let dir = ctx.guard.check(shown)?;

    let is_dir = tokio::fs::metadata(&dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(ToolError::NotADirectory(shown.to_path_buf()));
    }
    Ok(Some(dir))
}

/// A string is split on whitespace; an array is taken verbatim.
fn git_args(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

pub async fn run_shell(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let command = args.str("command")?;
    let dir = working_dir(ctx, args).await?;
    let shell = ctx
        .executables
        .shell
        .as_ref()
        .ok_or(ToolError::ExecutableNotFound("Command interpreter"))?;

    let request = RunRequest::new(&shell.program, "Command", ctx.timeouts.shell())
        .args(shell.command_args(command))
        .working_dir(dir);
    let result = ctx.runner.run(&request).await?;
    Ok(result.render())
}

pub async fn run_git(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let dir = working_dir(ctx, args).await?;
    let git = ctx
        .executables
        .git
        .as_ref()
        .ok_or(ToolError::ExecutableNotFound("Git"))?;

    let request = RunRequest::new(git, "Git command", ctx.timeouts.git())
        .args(git_args(args.value("args")))
        .working_dir(dir);
    let result = ctx.runner.run(&request).await?;
    Ok(result.render())
}
