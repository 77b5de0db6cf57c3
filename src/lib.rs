//! # run-checks
//!
//! Runs the shared Eclipse OpenSOVD pre-commit checks against a project.
//!
//! The shared pre-commit configuration, the license-annotation hook script,
//! the REUSE header template and the license text live in a remote
//! repository. `run-checks` fetches them for a given branch, patches them
//! for this run, runs `pre-commit run --all-files` and removes everything it
//! created afterwards.
//!
//! ## Features
//!
//! - **Local overrides**: use a local config or hook script instead of the
//!   shared one
//! - **Fix mode**: let formatters rewrite files in place, or only report
//!   with `--no-fix`
//! - **Clean working tree**: only files pre-commit itself modifies remain
//!
//! ## Example
//!
//! ```rust,no_run
//! use run_checks::{resolve_config, HttpFetcher, RunOptions, Runner, Settings};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> run_checks::Result<()> {
//!     let root = std::env::current_dir().map_err(|e| run_checks::Error::io("cwd", e))?;
//!     let settings = Settings::load_or_default(&root)?;
//!     let run = resolve_config(RunOptions::default(), &settings)?;
//!
//!     let fetcher = HttpFetcher::new(settings.timeout()?)?;
//!     let runner = Runner::new(settings, root, fetcher)?;
//!     let code = runner.run(&run).await?;
//!
//!     std::process::exit(code);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/run-checks/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Awaited calls in tail position trip the 2024 drop-order lint; the order is harmless here
#![allow(tail_expr_drop_order)]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use config::{resolve_config, RunConfig, RunOptions, Settings};
pub use core::error::{Error, Result};
pub use core::fetch::{Fetch, HttpFetcher};
pub use core::runner::Runner;
