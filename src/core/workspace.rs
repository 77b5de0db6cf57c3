//! Bookkeeping for files the run creates in the working tree.
//!
//! Every file written by [`materialize`] comes back as a [`CleanupRecord`]
//! that lists the file and the directories created for it, deepest first.
//! [`cleanup`] is a plain function over those records, so the same routine
//! runs on the success path and on every error path.

use crate::core::error::{Error, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file this run created, plus the directories created to hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupRecord {
    /// The created file.
    pub path: PathBuf,
    /// Directories created for the file, deepest first.
    pub created_dirs: Vec<PathBuf>,
}

impl CleanupRecord {
    /// A record for a file whose parent already existed.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created_dirs: Vec::new(),
        }
    }
}

/// Records owned by a single run.
#[derive(Debug, Default)]
pub struct CleanupLedger {
    records: Vec<CleanupRecord>,
}

impl CleanupLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records collected so far.
    #[must_use]
    pub fn records(&self) -> &[CleanupRecord] {
        &self.records
    }

    /// Adds a file created outside [`materialize`], e.g. a temp file.
    pub fn track(&mut self, record: CleanupRecord) {
        self.records.push(record);
    }

    /// Writes `content` to `path` unless it exists, recording what was created.
    ///
    /// Returns `true` when the file was written.
    pub fn materialize(&mut self, path: &Path, content: &str) -> Result<bool> {
        match materialize(path, content)? {
            Some(record) => {
                self.records.push(record);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Removes everything recorded and empties the ledger.
    pub fn cleanup(&mut self) {
        cleanup(&std::mem::take(&mut self.records));
    }
}

/// Writes `content` to `path`, creating missing parent directories.
///
/// An existing path is left untouched and yields `None`. On failure, the
/// partially created file and directories are removed again.
pub fn materialize(path: &Path, content: &str) -> Result<Option<CleanupRecord>> {
    if path.symlink_metadata().is_ok() {
        tracing::debug!("{} already exists, leaving it untouched", path.display());
        return Ok(None);
    }

    let record = CleanupRecord {
        path: path.to_path_buf(),
        created_dirs: missing_ancestors(path),
    };

    if let Err(e) = write_new(path, content) {
        if e.kind() != ErrorKind::AlreadyExists {
            remove_file(path);
        }
        for dir in &record.created_dirs {
            remove_dir(dir);
        }
        return Err(Error::io(format!("write {}", path.display()), e));
    }

    tracing::debug!("Wrote {}", path.display());
    Ok(Some(record))
}

/// Creates parents as needed and writes a file that must not exist yet.
fn write_new(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// Returns the ancestors of `path` that do not exist yet, deepest first.
fn missing_ancestors(path: &Path) -> Vec<PathBuf> {
    path.ancestors()
        .skip(1)
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .map(Path::to_path_buf)
        .collect()
}

/// Removes recorded files, then their directories deepest first.
///
/// Files that are already gone and directories that are gone or still hold
/// other entries are skipped silently. Any other failure is logged; cleanup
/// never fails.
pub fn cleanup(records: &[CleanupRecord]) {
    for record in records {
        remove_file(&record.path);
        for dir in &record.created_dirs {
            remove_dir(dir);
        }
    }
}

fn remove_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
    }
}

fn remove_dir(dir: &Path) {
    match std::fs::remove_dir(dir) {
        Ok(()) => tracing::debug!("Removed {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {},
        Err(e) => {
            let has_entries = std::fs::read_dir(dir)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
            if has_entries {
                tracing::debug!("Keeping {}: not empty", dir.display());
            } else {
                tracing::warn!("Failed to remove {}: {e}", dir.display());
            }
        },
    }
}

/// Marks a file executable for its owner, group and others.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .map_err(|e| Error::io("get script metadata", e))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| Error::io("set script perms", e))
}

/// Marks a file executable for its owner, group and others.
#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_materialize_records_created_dirs_deepest_first() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(".reuse/templates/opensovd.jinja2");

        let record = materialize(&path, "{{ copyright }}")
            .expect("materialize")
            .expect("file is new");

        assert_eq!(record.path, path);
        assert_eq!(
            record.created_dirs,
            vec![
                temp.path().join(".reuse/templates"),
                temp.path().join(".reuse"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "{{ copyright }}"
        );
    }

    #[test]
    fn test_materialize_existing_parent_records_no_dirs() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("reuse-annotate.sh");

        let record = materialize(&path, "#!/bin/sh\n")
            .expect("materialize")
            .expect("file is new");
        assert!(record.created_dirs.is_empty());
    }

    #[test]
    fn test_materialize_existing_file_is_untouched() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("LICENSES/MIT.txt");
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
        std::fs::write(&path, "original").expect("write");

        let mut ledger = CleanupLedger::new();
        let written = ledger.materialize(&path, "replacement").expect("materialize");

        assert!(!written);
        assert!(ledger.records().is_empty());
        ledger.cleanup();
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "original");
    }

    #[test]
    fn test_cleanup_removes_files_and_created_dirs() {
        let temp = TempDir::new().expect("create temp dir");
        let mut ledger = CleanupLedger::new();
        ledger
            .materialize(&temp.path().join("LICENSES/Apache-2.0.txt"), "text")
            .expect("materialize");
        ledger
            .materialize(&temp.path().join("reuse-annotate.sh"), "#!/bin/sh\n")
            .expect("materialize");

        ledger.cleanup();

        assert!(ledger.records().is_empty());
        assert_eq!(std::fs::read_dir(temp.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn test_cleanup_keeps_dirs_that_gained_entries() {
        let temp = TempDir::new().expect("create temp dir");
        let record = materialize(&temp.path().join("LICENSES/MIT.txt"), "text")
            .expect("materialize")
            .expect("file is new");
        std::fs::write(temp.path().join("LICENSES/other.txt"), "keep").expect("write");

        cleanup(&[record]);

        assert!(!temp.path().join("LICENSES/MIT.txt").exists());
        assert!(temp.path().join("LICENSES/other.txt").exists());
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        let temp = TempDir::new().expect("create temp dir");
        let record = materialize(&temp.path().join("a/b/file.txt"), "x")
            .expect("materialize")
            .expect("file is new");
        std::fs::remove_dir_all(temp.path().join("a")).expect("remove manually");

        cleanup(&[record.clone(), record]);

        assert!(!temp.path().join("a").exists());
    }

    #[test]
    fn test_tracked_temp_file_is_removed() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "repos: []").expect("write");

        let mut ledger = CleanupLedger::new();
        ledger.track(CleanupRecord::file(&path));
        ledger.cleanup();

        assert!(!path.exists());
    }

    #[test]
    fn test_missing_ancestors_stops_at_existing_dir() {
        let temp = TempDir::new().expect("create temp dir");
        std::fs::create_dir(temp.path().join("x")).expect("create dir");

        let missing = missing_ancestors(&temp.path().join("x/y/z/file"));
        assert_eq!(
            missing,
            vec![temp.path().join("x/y/z"), temp.path().join("x/y")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_make_executable() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("hook.sh");
        std::fs::write(&path, "#!/bin/sh\n").expect("write");

        make_executable(&path).expect("chmod");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
