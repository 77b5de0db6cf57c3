//! Configuration handling for run-checks.
//!
//! Two layers live here:
//! - [`Settings`]: process-wide, read-only values (remote layout, defaults,
//!   downstream tool) loaded from an optional `run-checks.toml`.
//! - [`RunConfig`]: the per-run values resolved from command-line inputs
//!   on top of those settings.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "run-checks.toml";

/// Branch used when none is given.
pub const DEFAULT_BRANCH: &str = "main";

/// Remote directory holding the shared artifacts. `{branch}` is substituted.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/eclipse-opensovd/cicd-workflows/{branch}/pre-commit-action";

/// Copyright holder written into license headers.
pub const DEFAULT_COPYRIGHT: &str = "The Contributors to Eclipse OpenSOVD (see CONTRIBUTORS)";

/// SPDX license identifier.
pub const DEFAULT_LICENSE: &str = "Apache-2.0";

/// Name of the REUSE header template.
pub const DEFAULT_TEMPLATE: &str = "opensovd";

/// Network timeout for a single download.
pub const DEFAULT_TIMEOUT: &str = "30s";

/// Downstream tool program.
pub const DEFAULT_TOOL: &str = "pre-commit";

/// Placeholder in `remote.base_url` replaced with the branch name.
const BRANCH_PLACEHOLDER: &str = "{branch}";

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where artifacts are downloaded from.
    pub remote: RemoteConfig,
    /// Values used when the command line leaves them unset.
    pub defaults: DefaultsConfig,
    /// Downstream tool invocation.
    pub tool: ToolConfig,
}

/// Remote repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL template containing `{branch}`.
    pub base_url: String,
    /// Download timeout (e.g., "30s", "2m").
    pub timeout: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }
}

/// Default run values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Copyright text.
    pub copyright: String,
    /// SPDX license identifier.
    pub license: String,
    /// REUSE template name.
    pub template: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            copyright: DEFAULT_COPYRIGHT.to_string(),
            license: DEFAULT_LICENSE.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Downstream tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Program name or path.
    pub program: String,
    /// Arguments placed before `run`, e.g. `["pre-commit"]` for `uvx`.
    pub args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_TOOL.to_string(),
            args: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from the nearest `run-checks.toml` at or above `start`,
    /// falling back to built-in defaults when there is none.
    pub fn load_or_default(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::load_from(&path)
            },
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            current = dir.parent();
        }
        None
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if !self.remote.base_url.contains(BRANCH_PLACEHOLDER) {
            return Err(Error::config_invalid(
                "remote.base_url",
                format!("Missing {BRANCH_PLACEHOLDER} placeholder: {}", self.remote.base_url),
            ));
        }

        if humantime::parse_duration(&self.remote.timeout).is_err() {
            return Err(Error::config_invalid(
                "remote.timeout",
                format!("Invalid duration: {}", self.remote.timeout),
            ));
        }

        if self.tool.program.trim().is_empty() {
            return Err(Error::config_invalid("tool.program", "Must not be empty"));
        }

        Ok(())
    }

    /// Applies command-line overrides for the remote settings.
    ///
    /// Empty values are ignored.
    pub fn with_remote_overrides(
        mut self,
        base_url: Option<String>,
        timeout: Option<String>,
    ) -> Result<Self> {
        if let Some(url) = non_empty(base_url) {
            self.remote.base_url = url;
        }
        if let Some(timeout) = non_empty(timeout) {
            self.remote.timeout = timeout;
        }
        self.validate()?;
        Ok(self)
    }

    /// Returns the parsed download timeout.
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.remote.timeout).map_err(|e| {
            Error::config_invalid("remote.timeout", format!("Invalid duration: {e}"))
        })
    }

    /// Returns the base URL for `branch`, without a trailing slash.
    #[must_use]
    pub fn base_url(&self, branch: &str) -> String {
        self.remote
            .base_url
            .replace(BRANCH_PLACEHOLDER, branch)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Raw run inputs, as handed over by the command line.
///
/// Every value may be empty: CI systems often pass an empty string for an
/// input the user did not fill in.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Branch of the shared workflow repository.
    pub branch: Option<String>,
    /// Copyright text.
    pub copyright: Option<String>,
    /// SPDX license identifier.
    pub license: Option<String>,
    /// REUSE template name.
    pub template: Option<String>,
    /// Local pre-commit config to use instead of downloading one.
    pub config: Option<String>,
    /// Local hook script to use instead of downloading one.
    pub hook_script: Option<String>,
    /// Report only; do not let hooks modify files.
    pub no_fix: bool,
}

/// Fully resolved, immutable run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Branch of the shared workflow repository.
    pub branch: String,
    /// Copyright text.
    pub copyright: String,
    /// SPDX license identifier.
    pub license: String,
    /// REUSE template name.
    pub template: String,
    /// Local pre-commit config override.
    pub config_override: Option<PathBuf>,
    /// Local hook script override.
    pub hook_script_override: Option<PathBuf>,
    /// Whether hooks may fix files in place.
    pub fix_mode: bool,
}

/// Merges run inputs with the configured defaults.
///
/// License and template end up as file names below `LICENSES/` and
/// `.reuse/templates/`, so values containing a path separator are rejected.
pub fn resolve_config(options: RunOptions, settings: &Settings) -> Result<RunConfig> {
    let or_default =
        |value: Option<String>, default: &str| non_empty(value).unwrap_or_else(|| default.to_string());

    let run = RunConfig {
        branch: or_default(options.branch, DEFAULT_BRANCH),
        copyright: or_default(options.copyright, &settings.defaults.copyright),
        license: or_default(options.license, &settings.defaults.license),
        template: or_default(options.template, &settings.defaults.template),
        config_override: non_empty(options.config).map(PathBuf::from),
        hook_script_override: non_empty(options.hook_script).map(PathBuf::from),
        fix_mode: !options.no_fix,
    };

    ensure_file_name("license", &run.license)?;
    ensure_file_name("template", &run.template)?;
    Ok(run)
}

/// Rejects values that would escape the directory they are joined onto.
fn ensure_file_name(field: &str, value: &str) -> Result<()> {
    if value.contains(['/', '\\']) || value == ".." {
        return Err(Error::config_invalid(
            field,
            format!("Must be a plain name without path separators: {value}"),
        ));
    }
    Ok(())
}

/// Treats blank strings as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
