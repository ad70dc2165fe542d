//! Server configuration
//!
//! Everything has a default; the binary overrides a handful of fields from
//! its command line.

use crate::browser::BrowserConfig;
use crate::pipeline::DEFAULT_MAX_BATCH;
use crate::retention::{DEFAULT_KEEP, DEFAULT_RETENTION_DIR};
use std::path::PathBuf;

/// Default bind host (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8000;

/// Default request body limit: 20 cropped images at up to ~3 MiB each
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Top-level configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Directory holding persisted decks
    pub retention_dir: PathBuf,
    /// How many persisted decks to keep
    pub retention_keep: usize,
    /// Largest accepted batch
    pub max_batch: usize,
    /// Maximum request body size in bytes
    pub body_limit: usize,
    /// Browser launch settings shared by preview and generate
    pub browser: BrowserConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            retention_dir: PathBuf::from(DEFAULT_RETENTION_DIR),
            retention_keep: DEFAULT_KEEP,
            max_batch: DEFAULT_MAX_BATCH,
            body_limit: DEFAULT_BODY_LIMIT,
            browser: BrowserConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
