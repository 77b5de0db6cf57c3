//! The checks runner.
//!
//! A run moves linearly through its phases: acquire the four artifacts,
//! patch them, write them where pre-commit expects them, run pre-commit,
//! clean up. Cleanup runs whether or not an earlier phase failed.

use crate::checks::precommit;
use crate::config::{RunConfig, Settings};
use crate::core::artifact::{acquire_artifact, Artifact, ArtifactKind};
use crate::core::error::{Error, Result};
use crate::core::fetch::Fetch;
use crate::core::patch::{ConfigPatcher, HookPatcher};
use crate::core::workspace::{make_executable, CleanupLedger, CleanupRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Runner for a checks run.
#[derive(Debug)]
pub struct Runner<F> {
    settings: Settings,
    root: PathBuf,
    temp_dir: Option<PathBuf>,
    fetcher: F,
    config_patcher: ConfigPatcher,
    hook_patcher: HookPatcher,
}

impl<F: Fetch> Runner<F> {
    /// Creates a runner operating on the project at `root`.
    pub fn new(settings: Settings, root: impl Into<PathBuf>, fetcher: F) -> Result<Self> {
        Ok(Self {
            settings,
            root: root.into(),
            temp_dir: None,
            fetcher,
            config_patcher: ConfigPatcher::new()?,
            hook_patcher: HookPatcher::new()?,
        })
    }

    /// Places the patched pre-commit config in `dir` instead of the system
    /// temp directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Returns the fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs the checks and returns pre-commit's exit code.
    ///
    /// Every file and directory created on the way is removed before this
    /// returns, on success and on error alike.
    pub async fn run(&self, run: &RunConfig) -> Result<i32> {
        let mut ledger = CleanupLedger::new();
        let result = self.run_phases(run, &mut ledger).await;

        tracing::debug!("Cleaning up {} created file(s)", ledger.records().len());
        ledger.cleanup();

        result
    }

    async fn run_phases(&self, run: &RunConfig, ledger: &mut CleanupLedger) -> Result<i32> {
        let mut artifacts = self.acquire(run).await?;
        self.patch(run, &mut artifacts);
        let config_path = self.write(run, &artifacts, ledger)?;

        tracing::info!("Running pre-commit checks...");
        precommit::run_downstream_tool(&self.settings.tool, &config_path, &self.root).await
    }

    /// Acquires every artifact in order.
    ///
    /// Failing to download a required artifact aborts the run; an optional
    /// one is skipped with a warning.
    async fn acquire(&self, run: &RunConfig) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            match self.acquire_one(kind, run).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) if e.is_fetch() && !kind.is_required() => {
                    tracing::warn!("Skipping {kind}: {e}");
                },
                Err(e) => return Err(e),
            }
        }
        Ok(artifacts)
    }

    async fn acquire_one(&self, kind: ArtifactKind, run: &RunConfig) -> Result<Artifact> {
        let local_override = kind.local_override(run);
        let cwd_fallback = self.root.join(kind.relative_path(run));
        let remote_url = kind.remote_url(&self.settings.base_url(&run.branch), run);

        let spinner = (local_override.is_none() && !cwd_fallback.is_file()).then(|| {
            tracing::info!("Downloading {kind} from: {remote_url}");
            download_spinner(kind)
        });

        let result = acquire_artifact(
            &self.fetcher,
            kind,
            local_override,
            &cwd_fallback,
            &remote_url,
        )
        .await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let artifact = result?;
        if artifact.is_remote() {
            tracing::debug!("Downloaded {kind} ({} bytes)", artifact.content.len());
        } else {
            tracing::debug!("Using {kind} from {}", artifact.source);
        }
        Ok(artifact)
    }

    /// Applies the config and hook-script patches in place.
    fn patch(&self, run: &RunConfig, artifacts: &mut [Artifact]) {
        for artifact in artifacts {
            artifact.content = match artifact.kind {
                ArtifactKind::PreCommitConfig => {
                    self.config_patcher.patch(&artifact.content, run.fix_mode)
                },
                ArtifactKind::HookScript => self.hook_patcher.patch(
                    &artifact.content,
                    &run.copyright,
                    &run.license,
                    &run.template,
                ),
                ArtifactKind::LicenseTemplate | ArtifactKind::LicenseText => continue,
            };
        }
    }

    /// Writes the artifacts and returns the path of the patched config.
    fn write(
        &self,
        run: &RunConfig,
        artifacts: &[Artifact],
        ledger: &mut CleanupLedger,
    ) -> Result<PathBuf> {
        let mut config_path = None;

        for artifact in artifacts {
            match artifact.kind {
                ArtifactKind::PreCommitConfig => {
                    config_path = Some(self.write_temp_config(&artifact.content, ledger)?);
                },
                ArtifactKind::HookScript => {
                    let path = self.root.join(artifact.kind.relative_path(run));
                    if ledger.materialize(&path, &artifact.content)? {
                        make_executable(&path)?;
                    }
                },
                ArtifactKind::LicenseTemplate | ArtifactKind::LicenseText => {
                    let path = self.root.join(artifact.kind.relative_path(run));
                    ledger.materialize(&path, &artifact.content)?;
                },
            }
        }

        config_path.ok_or_else(|| Error::Internal {
            message: "pre-commit config was not acquired".to_string(),
        })
    }

    /// Writes the patched config to a temp file tracked by `ledger`.
    fn write_temp_config(&self, content: &str, ledger: &mut CleanupLedger) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pre-commit-config-").suffix(".yml");

        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| Error::io("create temp config", e))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::io("write temp config", e))?;

        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| Error::io("keep temp config", e.error))?;
        ledger.track(CleanupRecord::file(&path));

        tracing::debug!("Patched config written to {}", path.display());
        Ok(path)
    }
}

/// Spinner shown while an artifact downloads.
fn download_spinner(kind: ArtifactKind) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .ok()
            .unwrap_or_else(ProgressStyle::default_spinner),
    );
    pb.set_message(format!("Downloading {kind}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
