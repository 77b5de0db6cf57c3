//! CLI command implementation.

use super::Cli;
use crate::config::{resolve_config, Settings};
use crate::core::error::{Error, Result};
use crate::core::fetch::HttpFetcher;
use crate::core::runner::Runner;
use console::style;
use std::process::ExitCode;

/// Runs the checks for the parsed command line.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let root = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;

    let settings = Settings::load_or_default(&root)?
        .with_remote_overrides(cli.base_url.clone(), cli.timeout.clone())?;
    let run = resolve_config(cli.run_options(), &settings)?;

    tracing::debug!("Resolved run configuration: {run:?}");
    eprintln!(
        "{} Branch: {} ({} mode)",
        style("•").cyan(),
        style(&run.branch).bold(),
        if run.fix_mode { "fix" } else { "check-only" }
    );

    let fetcher = HttpFetcher::new(settings.timeout()?)?;
    let runner = Runner::new(settings, root, fetcher)?;

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal {
            message: format!("Failed to create runtime: {e}"),
        })?
        .block_on(runner.run(&run));

    match result {
        Ok(0) => {
            eprintln!("{} All checks passed", style("✓").green().bold());
            Ok(ExitCode::SUCCESS)
        },
        Ok(code) => {
            eprintln!(
                "{} pre-commit exited with code {code}",
                style("✗").red().bold()
            );
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        },
        Err(e) if e.is_fetch() => {
            eprintln!("{} {e}", style("✗").red().bold());
            eprintln!(
                "  Make sure the branch '{}' exists in the repository.",
                run.branch
            );
            Ok(ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1)))
        },
        Err(e) => Err(e),
    }
}
