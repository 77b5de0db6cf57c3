//! The four shared artifacts and where each one comes from.

use crate::config::RunConfig;
use crate::core::error::{Error, Result};
use crate::core::fetch::Fetch;
use std::path::{Path, PathBuf};

/// File name of the pre-commit config in the remote and working directory.
pub const PRE_COMMIT_CONFIG_FILE: &str = ".pre-commit-config.yml";

/// File name of the license-annotation hook script.
pub const HOOK_SCRIPT_FILE: &str = "reuse-annotate.sh";

/// Directory holding REUSE header templates.
pub const TEMPLATES_DIR: &str = ".reuse/templates";

/// Directory holding license texts.
pub const LICENSES_DIR: &str = "LICENSES";

/// One of the shared artifacts a run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The pre-commit configuration.
    PreCommitConfig,
    /// The license-annotation hook script.
    HookScript,
    /// The REUSE header template.
    LicenseTemplate,
    /// The license text.
    LicenseText,
}

impl ArtifactKind {
    /// Every artifact, required ones first.
    pub const ALL: [Self; 4] = [
        Self::PreCommitConfig,
        Self::HookScript,
        Self::LicenseTemplate,
        Self::LicenseText,
    ];

    /// Returns a human-readable name for the artifact.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PreCommitConfig => "pre-commit config",
            Self::HookScript => "hook script",
            Self::LicenseTemplate => "license template",
            Self::LicenseText => "license text",
        }
    }

    /// Returns whether a failed download aborts the run.
    ///
    /// Template and license text are best effort.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::PreCommitConfig | Self::HookScript)
    }

    /// Local file given for this artifact on the command line, if any.
    #[must_use]
    pub fn local_override<'a>(&self, run: &'a RunConfig) -> Option<&'a Path> {
        match self {
            Self::PreCommitConfig => run.config_override.as_deref(),
            Self::HookScript => run.hook_script_override.as_deref(),
            Self::LicenseTemplate | Self::LicenseText => None,
        }
    }

    /// Path of the artifact relative to the project root.
    ///
    /// This is both where an existing copy is looked for and, except for the
    /// pre-commit config, where the downloaded copy is written.
    #[must_use]
    pub fn relative_path(&self, run: &RunConfig) -> PathBuf {
        match self {
            Self::PreCommitConfig => PathBuf::from(PRE_COMMIT_CONFIG_FILE),
            Self::HookScript => PathBuf::from(HOOK_SCRIPT_FILE),
            Self::LicenseTemplate => {
                Path::new(TEMPLATES_DIR).join(format!("{}.jinja2", run.template))
            },
            Self::LicenseText => Path::new(LICENSES_DIR).join(format!("{}.txt", run.license)),
        }
    }

    /// URL of the artifact below `base_url`.
    #[must_use]
    pub fn remote_url(&self, base_url: &str, run: &RunConfig) -> String {
        let relative = self.relative_path(run);
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{base_url}/{relative}")
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where an artifact's content was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A path given on the command line.
    LocalOverride(PathBuf),
    /// A file already present in the project.
    WorkingDirectory(PathBuf),
    /// Downloaded from this URL.
    Remote(String),
}

impl std::fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalOverride(path) => write!(f, "{} (local override)", path.display()),
            Self::WorkingDirectory(path) => write!(f, "{} (working directory)", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// An acquired artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Which artifact this is.
    pub kind: ArtifactKind,
    /// Where the content came from.
    pub source: ArtifactSource,
    /// Text content, possibly patched.
    pub content: String,
}

impl Artifact {
    /// Returns true if the content was downloaded.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.source, ArtifactSource::Remote(_))
    }
}

/// Gets an artifact's content from the first source that applies.
///
/// Order: `local_override` when given, then `cwd_fallback` when that file
/// exists, then a download of `remote_url`. A failed download is an
/// [`Error::Fetch`]; whether that aborts the run is up to the caller.
pub async fn acquire_artifact<F: Fetch>(
    fetcher: &F,
    kind: ArtifactKind,
    local_override: Option<&Path>,
    cwd_fallback: &Path,
    remote_url: &str,
) -> Result<Artifact> {
    if let Some(path) = local_override {
        if !path.is_file() {
            return Err(Error::LocalArtifactNotFound {
                artifact: kind.name().to_string(),
                path: path.to_path_buf(),
            });
        }
        let content = read(kind, path)?;
        return Ok(Artifact {
            kind,
            source: ArtifactSource::LocalOverride(path.to_path_buf()),
            content,
        });
    }

    if cwd_fallback.is_file() {
        let content = read(kind, cwd_fallback)?;
        return Ok(Artifact {
            kind,
            source: ArtifactSource::WorkingDirectory(cwd_fallback.to_path_buf()),
            content,
        });
    }

    let content = fetcher
        .fetch(remote_url)
        .await
        .map_err(|failure| Error::fetch(kind.name(), remote_url, failure.status, failure.message))?;

    Ok(Artifact {
        kind,
        source: ArtifactSource::Remote(remote_url.to_string()),
        content,
    })
}

fn read(kind: ArtifactKind, path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("read {} {}", kind.name(), path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_config, RunOptions, Settings};
    use crate::core::fetch::FetchFailure;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Serves one fixed response and counts requests.
    struct StaticFetcher {
        response: std::result::Result<String, FetchFailure>,
        calls: Cell<usize>,
    }

    impl StaticFetcher {
        fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.to_string()),
                calls: Cell::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(FetchFailure::status(status, format!("HTTP {status}"))),
                calls: Cell::new(0),
            }
        }
    }

    impl Fetch for StaticFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<String, FetchFailure> {
            self.calls.set(self.calls.get() + 1);
            self.response.clone()
        }
    }

    fn default_run() -> RunConfig {
        resolve_config(RunOptions::default(), &Settings::default()).expect("resolve")
    }

    #[test]
    fn test_required_kinds() {
        assert!(ArtifactKind::PreCommitConfig.is_required());
        assert!(ArtifactKind::HookScript.is_required());
        assert!(!ArtifactKind::LicenseTemplate.is_required());
        assert!(!ArtifactKind::LicenseText.is_required());
    }

    #[test]
    fn test_all_lists_required_kinds_first() {
        let required: Vec<bool> = ArtifactKind::ALL.iter().map(ArtifactKind::is_required).collect();
        assert_eq!(required, vec![true, true, false, false]);
    }

    #[test]
    fn test_local_overrides_only_for_config_and_hook() {
        let options = RunOptions {
            config: Some("ci.yml".to_string()),
            hook_script: Some("hook.sh".to_string()),
            ..RunOptions::default()
        };
        let run = resolve_config(options, &Settings::default()).expect("resolve");

        assert_eq!(
            ArtifactKind::PreCommitConfig.local_override(&run),
            Some(Path::new("ci.yml"))
        );
        assert_eq!(
            ArtifactKind::HookScript.local_override(&run),
            Some(Path::new("hook.sh"))
        );
        assert_eq!(ArtifactKind::LicenseTemplate.local_override(&run), None);
        assert_eq!(ArtifactKind::LicenseText.local_override(&run), None);
    }

    #[test]
    fn test_relative_paths() {
        let run = default_run();
        assert_eq!(
            ArtifactKind::LicenseTemplate.relative_path(&run),
            PathBuf::from(".reuse/templates/opensovd.jinja2")
        );
        assert_eq!(
            ArtifactKind::LicenseText.relative_path(&run),
            PathBuf::from("LICENSES/Apache-2.0.txt")
        );
        assert_eq!(
            ArtifactKind::HookScript.relative_path(&run),
            PathBuf::from("reuse-annotate.sh")
        );
    }

    #[test]
    fn test_remote_urls() {
        let run = default_run();
        let base = "https://example.com/main/pre-commit-action";
        assert_eq!(
            ArtifactKind::PreCommitConfig.remote_url(base, &run),
            "https://example.com/main/pre-commit-action/.pre-commit-config.yml"
        );
        assert_eq!(
            ArtifactKind::LicenseTemplate.remote_url(base, &run),
            "https://example.com/main/pre-commit-action/.reuse/templates/opensovd.jinja2"
        );
        assert_eq!(
            ArtifactKind::LicenseText.remote_url(base, &run),
            "https://example.com/main/pre-commit-action/LICENSES/Apache-2.0.txt"
        );
    }

    #[tokio::test]
    async fn test_local_override_wins() {
        let temp = TempDir::new().expect("create temp dir");
        let local = temp.path().join("my-config.yml");
        let fallback = temp.path().join(PRE_COMMIT_CONFIG_FILE);
        std::fs::write(&local, "local").expect("write");
        std::fs::write(&fallback, "cwd").expect("write");
        let fetcher = StaticFetcher::ok("remote");

        let artifact = acquire_artifact(
            &fetcher,
            ArtifactKind::PreCommitConfig,
            Some(&local),
            &fallback,
            "http://unused",
        )
        .await
        .expect("acquire");

        assert_eq!(artifact.content, "local");
        assert_eq!(artifact.source, ArtifactSource::LocalOverride(local));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_override_is_an_error() {
        let temp = TempDir::new().expect("create temp dir");
        let fetcher = StaticFetcher::ok("remote");

        let err = acquire_artifact(
            &fetcher,
            ArtifactKind::HookScript,
            Some(&temp.path().join("missing.sh")),
            &temp.path().join(HOOK_SCRIPT_FILE),
            "http://unused",
        )
        .await
        .expect_err("override does not exist");

        assert!(matches!(err, Error::LocalArtifactNotFound { .. }));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_working_directory_fallback() {
        let temp = TempDir::new().expect("create temp dir");
        let fallback = temp.path().join(HOOK_SCRIPT_FILE);
        std::fs::write(&fallback, "#!/bin/sh\n").expect("write");
        let fetcher = StaticFetcher::ok("remote");

        let artifact = acquire_artifact(
            &fetcher,
            ArtifactKind::HookScript,
            None,
            &fallback,
            "http://unused",
        )
        .await
        .expect("acquire");

        assert_eq!(artifact.content, "#!/bin/sh\n");
        assert!(!artifact.is_remote());
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_remote_fetch() {
        let temp = TempDir::new().expect("create temp dir");
        let fetcher = StaticFetcher::ok("repos: []\n");

        let artifact = acquire_artifact(
            &fetcher,
            ArtifactKind::PreCommitConfig,
            None,
            &temp.path().join(PRE_COMMIT_CONFIG_FILE),
            "http://example.com/.pre-commit-config.yml",
        )
        .await
        .expect("acquire");

        assert!(artifact.is_remote());
        assert_eq!(artifact.content, "repos: []\n");
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_is_fetch_error() {
        let temp = TempDir::new().expect("create temp dir");
        let fetcher = StaticFetcher::failing(404);

        let err = acquire_artifact(
            &fetcher,
            ArtifactKind::LicenseText,
            None,
            &temp.path().join("LICENSES/MIT.txt"),
            "http://example.com/LICENSES/MIT.txt",
        )
        .await
        .expect_err("404");

        assert!(matches!(err, Error::Fetch { status: Some(404), ref artifact, .. }
            if artifact == "license text"
        ));
    }
}
