//! Core functionality for run-checks.
//!
//! This module contains the main components:
//! - [`artifact`]: The shared artifacts and where each comes from
//! - [`error`]: Error types and result handling
//! - [`executor`]: Subprocess execution
//! - [`fetch`]: HTTP downloads
//! - [`patch`]: Config and hook-script rewriting
//! - [`runner`]: The run itself, from acquisition to cleanup
//! - [`workspace`]: Tracking and removing files the run creates

pub mod artifact;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod patch;
pub mod runner;
pub mod workspace;
