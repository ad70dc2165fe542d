//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Read;
use std::path::{Path, PathBuf};
use webdeck::browser::Capturer;
use webdeck::error::{NavigationError, Result};

/// Smallest byte string `image::guess_format` recognises as PNG
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-capture";

/// Capturer that writes [`PNG_BYTES`] and records every URL it was asked for
#[derive(Debug, Default)]
pub struct FakeCapturer {
    calls: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl FakeCapturer {
    /// Capturer that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Capturer that times out on `url`
    pub fn failing_on<S: Into<String>>(url: S) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(url.into()),
        }
    }

    /// URLs captured so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Capturer for FakeCapturer {
    async fn capture(&self, url: &str, output: &Path) -> Result<()> {
        self.calls.lock().push(url.to_string());
        if self.fail_on.as_deref() == Some(url) {
            return Err(NavigationError::Timeout(10_000).into());
        }
        tokio::fs::write(output, PNG_BYTES).await?;
        Ok(())
    }
}

/// Names of the regular files in `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Seed `count` old decks into `dir`, named for 2001-era timestamps
pub fn seed_old_decks(dir: &Path, count: usize) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|i| {
            let path = dir.join(format!("presentation_{}.pptx", 1_000_000_000 + i));
            std::fs::write(&path, b"old").unwrap();
            path
        })
        .collect()
}

/// Read one part out of a .pptx package
pub fn read_part(deck: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(deck)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    Some(data)
}

/// All part names in a .pptx package
pub fn part_names(deck: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(deck)).unwrap();
    archive.file_names().map(str::to_owned).collect()
}
