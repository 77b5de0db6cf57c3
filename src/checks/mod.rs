//! Downstream check tools.
//!
//! - [`precommit`]: runs the pre-commit framework with the patched config

pub mod precommit;
