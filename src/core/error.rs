//! Error types for run-checks.
//!
//! This module defines all errors that can occur during a run.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in run-checks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Description of the parse error.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    ConfigInvalid {
        /// Field name that is invalid.
        field: String,
        /// Description of why it's invalid.
        message: String,
    },

    // =========================================================================
    // Artifact errors
    // =========================================================================
    /// Downloading an artifact failed.
    #[error("Error downloading {artifact} from {url}: {message}")]
    Fetch {
        /// Artifact that was being downloaded.
        artifact: String,
        /// URL that was requested.
        url: String,
        /// HTTP status, when the server answered.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// A local override path does not exist.
    #[error("Local {artifact} not found: {path}")]
    LocalArtifactNotFound {
        /// Artifact that was overridden.
        artifact: String,
        /// Path that was given.
        path: PathBuf,
    },

    // =========================================================================
    // I/O errors
    // =========================================================================
    /// File I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of what failed.
        message: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Downstream tool errors
    // =========================================================================
    /// Pre-commit framework not found.
    #[error("Pre-commit framework not found: {program}. Install with: pip install pre-commit")]
    PreCommitNotFound {
        /// Program that was looked up.
        program: String,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Internal error (should never happen).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a new configuration parse error with source.
    pub fn config_parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn config_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a new fetch error.
    pub fn fetch(
        artifact: impl Into<String>,
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            artifact: artifact.into(),
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Returns true if this error came from downloading an artifact.
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Returns an exit code appropriate for this error.
    ///
    /// Every failure of the runner itself exits with 1; only the downstream
    /// tool decides other codes.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}
