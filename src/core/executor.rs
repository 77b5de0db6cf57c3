//! Subprocess execution.
//!
//! Programs are spawned directly with an argument vector, never through a
//! shell, so paths and user-supplied values need no quoting.

use crate::core::error::{Error, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code of the command (1 if it was killed by a signal).
    pub exit_code: i32,
    /// Duration the command took to run.
    pub duration: Duration,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
}

impl ExecuteOptions {
    /// Sets the working directory.
    #[must_use]
    pub fn cwd(mut self, path: impl AsRef<Path>) -> Self {
        self.cwd = Some(path.as_ref().to_path_buf());
        self
    }
}

/// Executor for running programs.
#[derive(Debug, Default)]
pub struct Executor;

impl Executor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// Output streams straight to the console. A non-zero exit status is
    /// reported in the outcome, not as an error.
    pub async fn execute<I, S>(
        &self,
        program: &str,
        args: I,
        options: ExecuteOptions,
    ) -> Result<CommandOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let start = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(ref cwd) = options.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!("Running {program}");

        let status = cmd
            .status()
            .await
            .map_err(|e| Error::io(format!("run {program}"), e))?;

        Ok(CommandOutcome {
            exit_code: status.code().unwrap_or(1),
            duration: start.elapsed(),
        })
    }

    /// Checks if a command exists in PATH (or, for a path, is executable).
    #[must_use]
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }
}
