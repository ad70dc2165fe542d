//! webdeck server
//!
//! Serves the UI and the preview/generate API.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webdeck::browser::BrowserConfig;
use webdeck::config::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Turn web pages into a slide deck
#[derive(Parser, Debug)]
#[command(name = "webdeck")]
#[command(version)]
#[command(about = "Screenshot web pages into a .pptx deck over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Directory for persisted decks
    #[arg(long)]
    retention_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut browser = BrowserConfig::builder();
    if let Some(path) = args.chrome_path {
        browser = browser.chrome_path(path);
    }

    let mut config = ServerConfig {
        host: args.host,
        port: args.port,
        browser: browser.build(),
        ..ServerConfig::default()
    };
    if let Some(dir) = args.retention_dir {
        config.retention_dir = dir;
    }

    tracing::info!("webdeck {} starting on {}", webdeck::VERSION, config.bind_addr());

    webdeck::server::serve(config)
        .await
        .context("server terminated with an error")
}
