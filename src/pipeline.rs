//! Batch pipeline: URLs (and optional cropped images) in, persisted deck out
//!
//! ```text
//! items ──▶ validate ──▶ per item: write cropped bytes | capture URL
//!                               │
//!                               ▼
//!                        DeckAssembler ──▶ RetentionStore::persist
//!                               │
//!          always ──▶ Workspace::cleanup ──▶ RetentionStore::prune
//! ```
//!
//! Items are processed strictly in order, one browser session at a time.

use crate::browser::Capturer;
use crate::deck::DeckAssembler;
use crate::error::{Error, PipelineError, Result};
use crate::retention::RetentionStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, error, info, instrument, warn};

/// Largest batch accepted by default
pub const DEFAULT_MAX_BATCH: usize = 20;

/// One batch entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequestItem {
    /// Page to capture
    pub url: String,
    /// Pre-cropped image; when present no capture is made
    pub cropped_image: Option<Vec<u8>>,
}

impl CaptureRequestItem {
    /// Item that needs a capture
    pub fn url<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            cropped_image: None,
        }
    }

    /// Item with user-supplied image bytes
    pub fn cropped<S: Into<String>>(url: S, image: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            cropped_image: Some(image),
        }
    }
}

/// A deck that made it into the retention directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDeck {
    /// Path inside the retention directory
    pub path: PathBuf,
    /// Number of content slides
    pub slide_count: usize,
    /// Deck contents, read before any prune can touch the file
    pub data: Vec<u8>,
}

/// What a [`Workspace`] cleanup managed to remove
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Tracked files deleted
    pub files_removed: usize,
    /// Paths whose removal failed
    pub failures: Vec<PathBuf>,
}

/// Per-request scratch directory.
///
/// Tracks every file handed out so cleanup can remove them one by one,
/// logging rather than raising on failure. Cleanup runs from `Drop` too, so
/// an early return or a cancelled request still leaves nothing behind.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Workspace {
    /// Create a fresh directory under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("webdeck-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        let root = dir.path().to_path_buf();
        debug!("Created workspace {}", root.display());
        Ok(Self {
            dir: Some(dir),
            root,
            files: Vec::new(),
        })
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Reserve a file name inside the workspace and track it for cleanup
    pub fn track(&mut self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        self.files.push(path.clone());
        path
    }

    /// Remove tracked files, then the directory. Idempotent.
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        for file in self.files.drain(..) {
            if !file.exists() {
                continue;
            }
            match std::fs::remove_file(&file) {
                Ok(()) => report.files_removed += 1,
                Err(e) => {
                    error!("Error cleaning up temporary file {}: {}", file.display(), e);
                    report.failures.push(file);
                }
            }
        }

        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                error!("Error removing temporary directory {}: {}", self.root.display(), e);
                report.failures.push(self.root.clone());
            }
        }
        report
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            self.cleanup();
        }
    }
}

/// The generate pipeline
pub struct DeckPipeline {
    capturer: Arc<dyn Capturer>,
    assembler: DeckAssembler,
    retention: RetentionStore,
    max_batch: usize,
    scratch_root: Option<PathBuf>,
}

impl DeckPipeline {
    /// Create a pipeline with default assembler and batch limit
    pub fn new(capturer: Arc<dyn Capturer>, retention: RetentionStore) -> Self {
        Self {
            capturer,
            assembler: DeckAssembler::default(),
            retention,
            max_batch: DEFAULT_MAX_BATCH,
            scratch_root: None,
        }
    }

    /// Override the batch limit
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Put per-request workspaces under `root` instead of the system temp dir
    pub fn with_scratch_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Replace the deck assembler
    pub fn with_assembler(mut self, assembler: DeckAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Retention store used for persisted decks
    pub fn retention(&self) -> &RetentionStore {
        &self.retention
    }

    /// The capturer shared with the preview path
    pub fn capturer(&self) -> Arc<dyn Capturer> {
        Arc::clone(&self.capturer)
    }

    /// Check batch bounds before any work happens
    pub fn validate(&self, items: &[CaptureRequestItem]) -> std::result::Result<(), PipelineError> {
        if items.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }
        if items.len() > self.max_batch {
            return Err(PipelineError::BatchTooLarge {
                max: self.max_batch,
                actual: items.len(),
            });
        }
        Ok(())
    }

    /// Run a batch end to end.
    ///
    /// Input errors come back as [`PipelineError::EmptyBatch`] or
    /// [`PipelineError::BatchTooLarge`]; every other failure is logged in
    /// full and returned as [`PipelineError::GenerationFailed`].
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn generate(&self, items: Vec<CaptureRequestItem>) -> Result<PersistedDeck> {
        self.validate(&items)?;

        let result = match Workspace::create(self.scratch_root.as_deref()) {
            Ok(mut workspace) => {
                let result = self.run(&mut workspace, items).await;
                let report = workspace.cleanup();
                debug!("Workspace cleanup removed {} files", report.files_removed);
                result
            }
            Err(e) => Err(e),
        };

        let retention = self.retention.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || retention.prune()).await {
            error!("Retention prune task failed: {}", e);
        }

        result.map_err(|e| {
            error!("Error generating presentation: {}", e);
            PipelineError::GenerationFailed(Box::new(e)).into()
        })
    }

    async fn run(
        &self,
        workspace: &mut Workspace,
        items: Vec<CaptureRequestItem>,
    ) -> Result<PersistedDeck> {
        let mut screenshots = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let path = workspace.track(&format!("screenshot_{}.png", i));
            match item.cropped_image {
                Some(bytes) => {
                    debug!("Using cropped image for item {} ({} bytes)", i, bytes.len());
                    tokio::fs::write(&path, &bytes).await?;
                }
                None => {
                    self.capturer.capture(&item.url, &path).await?;
                }
            }
            screenshots.push(path);
        }

        let output = workspace.track("presentation.pptx");
        let assembler = self.assembler.clone();
        let assembled = tokio::task::spawn_blocking(move || assembler.assemble(&screenshots, &output))
            .await
            .map_err(|e| Error::generic(format!("Deck assembly task failed: {}", e)))??;

        let retention = self.retention.clone();
        let source = assembled.path.clone();
        let persisted = tokio::task::spawn_blocking(move || retention.persist(&source))
            .await
            .map_err(|e| Error::generic(format!("Persist task failed: {}", e)))??;
        let data = tokio::fs::read(&persisted).await?;

        if !assembled.missing.is_empty() {
            warn!("Slides without images: {:?}", assembled.missing);
        }
        info!("Generated presentation with {} slides", assembled.slide_count);

        Ok(PersistedDeck {
            path: persisted,
            slide_count: assembled.slide_count,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_cleanup_is_idempotent() {
        let parent = tempfile::tempdir().unwrap();
        let mut ws = Workspace::create(Some(parent.path())).unwrap();
        let root = ws.path().to_path_buf();
        let file = ws.track("screenshot_0.png");
        std::fs::write(&file, b"x").unwrap();
        ws.track("never_written.png");

        let report = ws.cleanup();
        assert_eq!(report.files_removed, 1);
        assert!(report.failures.is_empty());
        assert!(!root.exists());

        assert_eq!(ws.cleanup(), CleanupReport::default());
    }

    #[test]
    fn test_workspace_drop_cleans_up() {
        let parent = tempfile::tempdir().unwrap();
        let root = {
            let mut ws = Workspace::create(Some(parent.path())).unwrap();
            std::fs::write(ws.track("a.png"), b"x").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_item_constructors() {
        assert_eq!(CaptureRequestItem::url("https://a").cropped_image, None);
        assert_eq!(
            CaptureRequestItem::cropped("https://a", vec![1, 2]).cropped_image,
            Some(vec![1, 2])
        );
    }
}
