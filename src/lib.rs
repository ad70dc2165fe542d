//! webdeck - web pages in, slide deck out
//!
//! Captures each URL with headless Chrome (or takes a user-cropped image in
//! its place), packs the images into a `.pptx` with a title slide, and serves
//! the whole thing over a small HTTP API.
//!
//! # Architecture
//!
//! ```text
//! Browser UI ──▶ /api/preview ──▶ PreviewService ──┐
//!      │                                           ▼
//!      └──────▶ /api/generate ──▶ DeckPipeline ──▶ Capturer (CDP)
//!                                     │
//!                                     ▼
//!                              DeckAssembler ──▶ RetentionStore
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webdeck::browser::{BrowserConfig, ChromeCapturer};
//! use webdeck::pipeline::{CaptureRequestItem, DeckPipeline};
//! use webdeck::retention::RetentionStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let capturer = Arc::new(ChromeCapturer::new(BrowserConfig::default()));
//!     let pipeline = DeckPipeline::new(capturer, RetentionStore::default());
//!
//!     let deck = pipeline
//!         .generate(vec![CaptureRequestItem::url("https://example.com")])
//!         .await?;
//!     println!("Wrote {} slides to {}", deck.slide_count, deck.path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod cors;
pub mod deck;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod preview;
pub mod retention;
pub mod server;

// Re-exports for convenience
pub use browser::{Capturer, ChromeCapturer};
pub use config::ServerConfig;
pub use deck::{Deck, DeckAssembler};
pub use error::{Error, Result};
pub use pipeline::{CaptureRequestItem, DeckPipeline};
pub use retention::RetentionStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
