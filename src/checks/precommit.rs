//! Pre-commit framework integration.
//!
//! The downstream tool is run once, against all files, with the patched
//! config. Its own exit code is the result of the whole run.

use crate::config::ToolConfig;
use crate::core::error::{Error, Result};
use crate::core::executor::{ExecuteOptions, Executor};
use std::ffi::OsString;
use std::path::Path;

/// Checks if the configured tool can be found.
pub fn is_installed(tool: &ToolConfig) -> bool {
    Executor::command_exists(&tool.program)
}

/// Builds the argument vector for `run --all-files --config <path>`.
///
/// `tool.args` come first, so a launcher such as `uvx pre-commit` works.
pub fn run_args(tool: &ToolConfig, config_path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = tool.args.iter().map(OsString::from).collect();
    args.extend(["run", "--all-files", "--config"].map(OsString::from));
    args.push(config_path.as_os_str().to_os_string());
    args
}

/// Runs pre-commit on all files in `repo_root` and returns its exit code.
///
/// Output streams straight to the console. A failing exit code is returned,
/// not raised; only failing to start the tool is an error.
pub async fn run_downstream_tool(
    tool: &ToolConfig,
    config_path: &Path,
    repo_root: &Path,
) -> Result<i32> {
    if !is_installed(tool) {
        return Err(Error::PreCommitNotFound {
            program: tool.program.clone(),
        });
    }

    let outcome = Executor::new()
        .execute(
            &tool.program,
            run_args(tool, config_path),
            ExecuteOptions::default().cwd(repo_root),
        )
        .await?;

    tracing::debug!(
        "{} exited with {} after {:?}",
        tool.program,
        outcome.exit_code,
        outcome.duration
    );

    Ok(outcome.exit_code)
}
