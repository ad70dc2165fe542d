//! Page navigation
//!
//! Navigation succeeds once the new document has a `<body>`. Only that wait
//! is bounded by the timeout; the load event is never awaited, so slow
//! subresources do not count against it.

use crate::error::{NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// How often to poll for the document body while waiting
const BODY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// True once the navigated document (not the blank or error page) has a body
const DOCUMENT_READY_SCRIPT: &str = "(() => { \
    const href = document.location.href; \
    return document.body !== null && href !== 'about:blank' && !href.startsWith('chrome-error:'); \
})()";

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Parse and validate a URL for navigation.
    ///
    /// Accepts `http`, `https` and `file` schemes only.
    pub fn validate(raw: &str) -> std::result::Result<Url, NavigationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

        match url.scheme() {
            "http" | "https" | "file" => Ok(url),
            other => Err(NavigationError::InvalidUrl(format!(
                "unsupported scheme '{}': {}",
                other, trimmed
            ))),
        }
    }
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate `page` to `url` and wait until the document body is present.
    ///
    /// The navigation request runs alongside the body poll. Fails with
    /// [`NavigationError::Timeout`] if no body shows up within `timeout_ms`,
    /// and with [`NavigationError::LoadFailed`] if Chrome reports a network
    /// error for the request.
    #[instrument(skip(page))]
    pub async fn goto(page: &Page, url: &str, timeout_ms: u64) -> Result<()> {
        let url = UrlValidator::validate(url)?;
        info!("Navigating to: {}", url);

        let navigate = page.execute(NavigateParams::new(url.as_str()));
        let body = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            Self::wait_for_document_body(page),
        );
        tokio::pin!(navigate, body);

        let mut navigated = false;
        loop {
            tokio::select! {
                response = &mut navigate, if !navigated => {
                    let response = response
                        .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;
                    if let Some(error_text) = response.result.error_text.clone() {
                        return Err(NavigationError::LoadFailed(error_text).into());
                    }
                    debug!("Navigation committed: {}", url);
                    navigated = true;
                }
                ready = &mut body => {
                    ready.map_err(|_| NavigationError::Timeout(timeout_ms))?;
                    break;
                }
            }
        }

        debug!("Navigation complete: {}", url);
        Ok(())
    }

    /// Poll until the navigated document has a body; the caller bounds this
    /// with a timeout. Evaluation errors mid-navigation count as not ready.
    async fn wait_for_document_body(page: &Page) {
        loop {
            let ready = match page.evaluate(DOCUMENT_READY_SCRIPT).await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(_) => false,
            };
            if ready {
                return;
            }
            tokio::time::sleep(BODY_POLL_INTERVAL).await;
        }
    }

    /// Read `document.body.scrollHeight`
    pub async fn page_height(page: &Page) -> Result<f64> {
        let height: f64 = page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| crate::error::CaptureError::ScriptFailed(e.to_string()))?
            .into_value()
            .map_err(|e| crate::error::CaptureError::ScriptFailed(e.to_string()))?;
        Ok(height)
    }

    /// Scroll the window to a vertical offset
    pub async fn scroll_to(page: &Page, y: i64) -> Result<()> {
        let script = format!("window.scrollTo(0, {});", y);
        page.evaluate(script.as_str())
            .await
            .map_err(|e| crate::error::CaptureError::ScriptFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_web_and_file_urls() {
        assert!(UrlValidator::validate("https://example.com").is_ok());
        assert!(UrlValidator::validate("http://localhost:8000/path?q=1").is_ok());
        assert!(UrlValidator::validate("file:///tmp/page.html").is_ok());
        assert!(UrlValidator::validate("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(UrlValidator::validate("").is_err());
        assert!(UrlValidator::validate("not a url").is_err());
        assert!(UrlValidator::validate("ftp://example.com").is_err());
        assert!(UrlValidator::validate("javascript:alert(1)").is_err());
    }
}
