//! Retention directory for generated decks
//!
//! Successful requests copy their deck here as
//! `presentation_<unix-seconds>.pptx`. After every request, success or not,
//! [`RetentionStore::prune`] keeps only the newest `keep` files. Names sort
//! by their embedded timestamp, so "newest" is "last by name".
//!
//! Pruning takes no lock. Two requests pruning at once may both try to
//! delete the same file; the loser logs the failure and moves on.

use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{error, info, instrument};

/// Default number of decks to keep
pub const DEFAULT_KEEP: usize = 10;

/// Default retention directory, relative to the working directory
pub const DEFAULT_RETENTION_DIR: &str = "temp/presentations";

fn deck_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^presentation_(\d+)\.pptx$").expect("valid regex"))
}

/// Outcome of a prune pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// Files removed
    pub removed: Vec<PathBuf>,
    /// Files that could not be removed
    pub failed: Vec<PathBuf>,
}

/// A capped directory of persisted decks
#[derive(Debug, Clone)]
pub struct RetentionStore {
    dir: PathBuf,
    keep: usize,
}

impl RetentionStore {
    /// Create a store rooted at `dir`, keeping `keep` files
    pub fn new<P: Into<PathBuf>>(dir: P, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Retention directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files kept by [`prune`](Self::prune)
    pub fn keep(&self) -> usize {
        self.keep
    }

    /// File name for a deck persisted at `unix_seconds`
    pub fn file_name_for(unix_seconds: i64) -> String {
        format!("presentation_{}.pptx", unix_seconds)
    }

    /// Copy `source` into the store, named for the current time
    pub fn persist(&self, source: &Path) -> Result<PathBuf> {
        self.persist_at(source, chrono::Utc::now().timestamp())
    }

    /// Copy `source` into the store under the name for `unix_seconds`.
    ///
    /// Two decks persisted within the same second share a name; the later
    /// copy replaces the earlier one.
    #[instrument(skip(self))]
    pub fn persist_at(&self, source: &Path, unix_seconds: i64) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(Self::file_name_for(unix_seconds));
        std::fs::copy(source, &target)?;
        info!("Persisted presentation to {}", target.display());
        Ok(target)
    }

    /// Retained deck files, oldest first
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| deck_name_pattern().is_match(n))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Delete all but the newest `keep` decks.
    ///
    /// Never fails: listing and deletion errors are logged and reported.
    #[instrument(skip(self), fields(dir = %self.dir.display(), keep = self.keep))]
    pub fn prune(&self) -> PruneReport {
        let mut report = PruneReport::default();
        let files = match self.list() {
            Ok(files) => files,
            Err(e) => {
                error!("Error cleaning up old presentations: {}", e);
                return report;
            }
        };

        let excess = files.len().saturating_sub(self.keep);
        for old in files.into_iter().take(excess) {
            match std::fs::remove_file(&old) {
                Ok(()) => {
                    info!("Cleaned up old presentation: {}", old.display());
                    report.removed.push(old);
                }
                Err(e) => {
                    error!("Error removing old presentation {}: {}", old.display(), e);
                    report.failed.push(old);
                }
            }
        }
        report
    }
}

impl Default for RetentionStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_DIR, DEFAULT_KEEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seed(dir: &Path) -> PathBuf {
        let src = dir.join("source.pptx");
        std::fs::write(&src, b"deck").unwrap();
        src
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(RetentionStore::file_name_for(1_700_000_000), "presentation_1700000000.pptx");
    }

    #[test]
    fn test_persist_copies_and_keeps_source() {
        let scratch = tempfile::tempdir().unwrap();
        let src = seed(scratch.path());
        let store = RetentionStore::new(scratch.path().join("kept"), 10);

        let persisted = store.persist_at(&src, 42).unwrap();
        assert_eq!(persisted.file_name().unwrap(), "presentation_42.pptx");
        assert_eq!(std::fs::read(&persisted).unwrap(), b"deck");
        assert!(src.exists());
    }

    #[test]
    fn test_prune_keeps_newest() {
        let scratch = tempfile::tempdir().unwrap();
        let src = seed(scratch.path());
        let store = RetentionStore::new(scratch.path().join("kept"), 10);

        for t in 1_700_000_000..1_700_000_013 {
            store.persist_at(&src, t).unwrap();
        }
        let report = store.prune();
        assert_eq!(report.removed.len(), 3);
        assert!(report.failed.is_empty());

        let names: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names.first().unwrap(), "presentation_1700000003.pptx");
        assert_eq!(names.last().unwrap(), "presentation_1700000012.pptx");
    }

    #[test]
    fn test_prune_ignores_foreign_files() {
        let scratch = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(scratch.path(), 0);
        std::fs::write(scratch.path().join("notes.txt"), b"keep me").unwrap();
        std::fs::write(scratch.path().join("presentation_1.pptx"), b"x").unwrap();

        let report = store.prune();
        assert_eq!(report.removed.len(), 1);
        assert!(scratch.path().join("notes.txt").exists());
    }

    #[test]
    fn test_prune_missing_dir_is_noop() {
        let scratch = tempfile::tempdir().unwrap();
        let store = RetentionStore::new(scratch.path().join("never-created"), 10);
        assert_eq!(store.prune(), PruneReport::default());
    }
}
