//! Browser session lifecycle
//!
//! A [`BrowserSession`] owns one launched Chrome process and the task that
//! drives its CDP event stream. Sessions are scoped: call
//! [`BrowserSession::close`] for a graceful shutdown, and if the session is
//! dropped without it (error path, cancelled future) the `Drop` impl still
//! aborts the handler task and the browser process is killed.

use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Viewport width (default: 1920)
    pub width: u32,
    /// Viewport height (default: 1080)
    pub height: u32,
    /// Enable the Chrome sandbox (default: false, containers rarely allow it)
    pub sandbox: bool,
    /// Enable GPU acceleration (default: false)
    pub gpu: bool,
    /// How long to wait for the page body after navigation (default: 10000)
    pub page_load_timeout_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: false,
            gpu: false,
            page_load_timeout_ms: 10_000,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Chrome command-line switches implied by this config
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
        }
        if !self.gpu {
            args.push("--disable-gpu".to_string());
        }
        args.push("--disable-dev-shm-usage".to_string());
        args.push(format!("--window-size={},{}", self.width, self.height));
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Enable/disable GPU
    pub fn gpu(mut self, gpu: bool) -> Self {
        self.config.gpu = gpu;
        self
    }

    /// Set the body-presence timeout
    pub fn page_load_timeout_ms(mut self, ms: u64) -> Self {
        self.config.page_load_timeout_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// One launched browser process, released on close or drop
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: JoinHandle<()>,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a browser with the given config
    #[instrument(skip(config), fields(headless = config.headless))]
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = CdpBrowserConfig::builder().viewport(Viewport {
            width: config.width,
            height: config.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        });

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in config.launch_args() {
            builder = builder.arg(arg);
        }

        let cdp_config = builder.build().map_err(BrowserError::ConfigError)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched");

        Ok(Self {
            browser: Some(browser),
            handler: handler_task,
            config,
        })
    }

    /// Open a blank page
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<Page> {
        let browser = self.browser.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;
        debug!("Created new page");
        Ok(page)
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Close the browser and wait for the process to exit
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await.map_err(|e| Error::cdp(e.to_string()));
        if let Err(ref e) = closed {
            warn!("Graceful browser close failed, killing: {}", e);
            let _ = browser.kill().await;
        } else if let Err(e) = browser.wait().await {
            warn!("Waiting for browser exit failed: {}", e);
        }

        let _ = tokio::time::timeout(Duration::from_secs(5), &mut self.handler).await;
        debug!("Browser closed");
        closed.map(|_| ())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Dropping `Browser` kills the child process; the handler has nothing
        // left to drive after that.
        if self.browser.take().is_some() {
            debug!("Browser session dropped without close, killing");
        }
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert!(!config.sandbox);
        assert!(!config.gpu);
        assert_eq!(config.page_load_timeout_ms, 10_000);
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::builder()
            .headless(false)
            .viewport(1280, 720)
            .sandbox(true)
            .gpu(true)
            .page_load_timeout_ms(3000)
            .chrome_path("/usr/bin/chromium")
            .arg("--lang=en-US")
            .build();

        assert!(!config.headless);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert!(config.sandbox);
        assert!(config.gpu);
        assert_eq!(config.page_load_timeout_ms, 3000);
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.extra_args, vec!["--lang=en-US"]);
    }

    #[test]
    fn test_default_launch_args_disable_sandbox_and_gpu() {
        let args = BrowserConfig::default().launch_args();
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
    }

    #[test]
    fn test_launch_args_respect_toggles() {
        let args = BrowserConfig::builder().sandbox(true).gpu(true).build().launch_args();
        assert!(!args.contains(&"--no-sandbox".to_string()));
        assert!(!args.contains(&"--disable-gpu".to_string()));
    }
}
