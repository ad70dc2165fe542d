//! Screenshot capture
//!
//! [`ChromeCapturer`] is the production [`Capturer`]: every call launches its
//! own browser session and releases it before returning, so cookies, history
//! and viewport state never leak between captures. The scrolling mode is the
//! exception and keeps one session for all of its shots.

use crate::browser::navigation::PageNavigator;
use crate::browser::{BrowserConfig, BrowserSession};
use crate::error::{CaptureError, Error, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Delay after the body appears, for client-side rendering
pub const RENDER_SETTLE: Duration = Duration::from_secs(2);

/// Delay after each scroll in scrolling mode
pub const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Waits for a page to be "done enough" to photograph.
///
/// The shipped implementation is a fixed sleep; a readiness check can be
/// swapped in without touching the capture code.
#[async_trait]
pub trait Settle: Send + Sync + std::fmt::Debug {
    /// Return once the page is considered settled
    async fn settle(&self, page: &Page) -> Result<()>;
}

/// Sleep for a fixed duration, ignoring the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl Settle for FixedDelay {
    async fn settle(&self, _page: &Page) -> Result<()> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// Anything that can render a URL into an image file
#[async_trait]
pub trait Capturer: Send + Sync {
    /// Capture `url` and write a PNG to `output`
    async fn capture(&self, url: &str, output: &Path) -> Result<()>;
}

/// Vertical offsets for `num_slides` evenly spaced shots of a page
/// `page_height` pixels tall: `floor(page_height / num_slides * i)`.
pub fn scroll_offsets(page_height: f64, num_slides: u32) -> Vec<i64> {
    if num_slides == 0 {
        return Vec::new();
    }
    let step = page_height / f64::from(num_slides);
    (0..num_slides)
        .map(|i| (step * f64::from(i)).floor() as i64)
        .collect()
}

/// Headless-Chrome capturer
#[derive(Debug, Clone)]
pub struct ChromeCapturer {
    config: BrowserConfig,
    render_settle: Arc<dyn Settle>,
    scroll_settle: Arc<dyn Settle>,
}

impl ChromeCapturer {
    /// Create a capturer with the default fixed settle delays
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            render_settle: Arc::new(FixedDelay(RENDER_SETTLE)),
            scroll_settle: Arc::new(FixedDelay(SCROLL_SETTLE)),
        }
    }

    /// Replace the post-load settle strategy
    pub fn with_render_settle(mut self, settle: Arc<dyn Settle>) -> Self {
        self.render_settle = settle;
        self
    }

    /// Replace the post-scroll settle strategy
    pub fn with_scroll_settle(mut self, settle: Arc<dyn Settle>) -> Self {
        self.scroll_settle = settle;
        self
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Capture `num_slides` viewport shots down the length of one page.
    ///
    /// Files are written to `out_dir` as `screenshot_1.png` ..
    /// `screenshot_N.png`. One browser session serves every shot.
    #[instrument(skip(self, out_dir))]
    pub async fn capture_scrolling(
        &self,
        url: &str,
        num_slides: u32,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        if num_slides == 0 {
            return Err(CaptureError::InvalidArgument("num_slides must be at least 1".into()).into());
        }
        tokio::fs::create_dir_all(out_dir).await?;

        let session = BrowserSession::launch(self.config.clone()).await?;
        let result = self.scrolling_in(&session, url, num_slides, out_dir).await;
        if let Err(e) = session.close().await {
            warn!("Error closing browser after scrolling capture: {}", e);
        }
        result
    }

    async fn capture_in(&self, session: &BrowserSession, url: &str, output: &Path) -> Result<()> {
        let page = session.new_page().await?;
        PageNavigator::goto(&page, url, self.config.page_load_timeout_ms).await?;
        self.render_settle.settle(&page).await?;

        info!("Taking screenshot and saving to: {}", output.display());
        write_viewport_png(&page, output).await
    }

    async fn scrolling_in(
        &self,
        session: &BrowserSession,
        url: &str,
        num_slides: u32,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let page = session.new_page().await?;
        PageNavigator::goto(&page, url, self.config.page_load_timeout_ms).await?;
        self.render_settle.settle(&page).await?;

        let height = PageNavigator::page_height(&page).await?;
        debug!("Page height {} px, {} slices", height, num_slides);

        let mut shots = Vec::with_capacity(num_slides as usize);
        for (i, offset) in scroll_offsets(height, num_slides).into_iter().enumerate() {
            PageNavigator::scroll_to(&page, offset).await?;
            self.scroll_settle.settle(&page).await?;

            let path = out_dir.join(format!("screenshot_{}.png", i + 1));
            write_viewport_png(&page, &path).await?;
            shots.push(path);
        }
        Ok(shots)
    }
}

#[async_trait]
impl Capturer for ChromeCapturer {
    #[instrument(skip(self, output))]
    async fn capture(&self, url: &str, output: &Path) -> Result<()> {
        let session = BrowserSession::launch(self.config.clone()).await?;
        let result = self.capture_in(&session, url, output).await;
        if let Err(e) = session.close().await {
            warn!("Error cleaning up browser: {}", e);
        }

        result.map_err(|e| match e {
            Error::Navigation(_) | Error::Capture(_) => e,
            other => CaptureError::ScreenshotFailed(other.to_string()).into(),
        })
    }
}

/// Screenshot the current viewport as PNG and write it to `path`
async fn write_viewport_png(page: &Page, path: &Path) -> Result<()> {
    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .full_page(false)
        .build();

    let data = page
        .screenshot(params)
        .await
        .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &data).await?;
    debug!("Screenshot written: {} bytes", data.len());
    Ok(())
}
