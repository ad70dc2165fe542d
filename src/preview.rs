//! Single-URL preview capture
//!
//! Each preview is written to its own file under
//! `<temp>/webdeck-preview/` and read back for the response. The file is
//! left in place afterwards; the directory grows until the OS (or an
//! operator) reaps it.

use crate::browser::Capturer;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Subdirectory of the system temp dir holding preview images
pub const PREVIEW_DIR_NAME: &str = "webdeck-preview";

/// A captured preview
#[derive(Debug, Clone)]
pub struct Preview {
    /// Where the image was written
    pub path: PathBuf,
    /// PNG bytes
    pub data: Vec<u8>,
}

/// Captures one URL to a temp file and returns the bytes
#[derive(Clone)]
pub struct PreviewService {
    capturer: Arc<dyn Capturer>,
    dir: PathBuf,
}

impl PreviewService {
    /// Preview into the default temp subdirectory
    pub fn new(capturer: Arc<dyn Capturer>) -> Self {
        Self::with_dir(capturer, std::env::temp_dir().join(PREVIEW_DIR_NAME))
    }

    /// Preview into a specific directory
    pub fn with_dir<P: Into<PathBuf>>(capturer: Arc<dyn Capturer>, dir: P) -> Self {
        Self {
            capturer,
            dir: dir.into(),
        }
    }

    /// Directory preview files are written to
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Capture `url` and return the image
    #[instrument(skip(self))]
    pub async fn preview(&self, url: &str) -> Result<Preview> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.png", Uuid::new_v4()));

        self.capturer.capture(url, &path).await?;
        let data = tokio::fs::read(&path).await?;
        debug!("Preview captured: {} bytes at {}", data.len(), path.display());

        Ok(Preview { path, data })
    }
}
