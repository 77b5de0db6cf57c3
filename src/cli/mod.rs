//! Command-line interface for run-checks.
//!
//! `run-checks [BRANCH]` is the only command: it fetches the shared
//! artifacts for `BRANCH`, runs pre-commit and exits with its exit code.

mod commands;

use crate::config::RunOptions;
use crate::core::error::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the shared Eclipse OpenSOVD pre-commit checks.
#[derive(Debug, Parser)]
#[command(
    name = "run-checks",
    author,
    version,
    about = "Run the shared pre-commit checks against this project",
    long_about = r#"
run-checks downloads the shared pre-commit configuration, the
license-annotation hook script, the REUSE header template and the license
text for a branch of the shared workflow repository, runs

    pre-commit run --all-files --config <patched config>

in the current directory and removes everything it created.

By default hooks fix files in place. Use --no-fix in CI to only report.

Settings can be placed in run-checks.toml (searched upward from the current
directory). Empty values passed on the command line or via the environment
count as unset.
"#
)]
pub struct Cli {
    /// Branch of the shared workflow repository [default: main].
    #[arg(env = "RUN_CHECKS_BRANCH", value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Copyright text written into license headers.
    #[arg(long, env = "RUN_CHECKS_COPYRIGHT")]
    pub copyright: Option<String>,

    /// SPDX license identifier.
    #[arg(long, env = "RUN_CHECKS_LICENSE")]
    pub license: Option<String>,

    /// REUSE header template name.
    #[arg(long, env = "RUN_CHECKS_TEMPLATE")]
    pub template: Option<String>,

    /// Local pre-commit config to use instead of downloading one.
    #[arg(long, env = "RUN_CHECKS_CONFIG", value_name = "PATH")]
    pub config: Option<String>,

    /// Local hook script to use instead of downloading one.
    #[arg(long, env = "RUN_CHECKS_HOOK_SCRIPT", value_name = "PATH")]
    pub hook_script: Option<String>,

    /// Only report problems; do not let hooks modify files.
    #[arg(long)]
    pub no_fix: bool,

    /// Base URL of the shared artifacts; `{branch}` is substituted.
    #[arg(long, env = "RUN_CHECKS_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Download timeout (e.g., "30s", "2m").
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Splits out the per-run inputs.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            branch: self.branch.clone(),
            copyright: self.copyright.clone(),
            license: self.license.clone(),
            template: self.template.clone(),
            config: self.config.clone(),
            hook_script: self.hook_script.clone(),
            no_fix: self.no_fix,
        }
    }
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    commands::run(&cli)
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {},
    }
}
