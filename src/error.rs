//! Error types for webdeck
//!
//! One `thiserror` enum per layer, folded into the crate-wide [`Error`].
//! Client-facing HTTP mapping lives in `handlers::api`, not here.

use thiserror::Error;

/// The main error type for webdeck operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Deck assembly errors
    #[error("Deck error: {0}")]
    Deck(#[from] DeckError),

    /// Batch pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Session was already released
    #[error("Browser session already closed")]
    AlreadyClosed,
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page root element never appeared
    #[error("Page body not present after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// Script evaluation (scroll, page height) failed
    #[error("Script evaluation failed: {0}")]
    ScriptFailed(String),

    /// Invalid argument to a capture mode
    #[error("Invalid capture argument: {0}")]
    InvalidArgument(String),
}

/// Deck assembly errors
#[derive(Error, Debug)]
pub enum DeckError {
    /// Zip container write failed
    #[error("Failed to write deck container: {0}")]
    Container(#[from] zip::result::ZipError),

    /// Output path was unusable
    #[error("Invalid deck output path: {0}")]
    InvalidOutput(String),
}

/// Batch pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No items in the batch
    #[error("No URLs provided")]
    EmptyBatch,

    /// Batch exceeds the configured maximum
    #[error("Maximum {max} URLs allowed")]
    BatchTooLarge {
        /// Configured maximum
        max: usize,
        /// Size of the rejected batch
        actual: usize,
    },

    /// Capture, assembly, or persistence failed
    #[error("Failed to generate presentation")]
    GenerationFailed(#[source] Box<Error>),
}

/// Result type alias for webdeck operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// True for errors caused by the request itself rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Pipeline(PipelineError::EmptyBatch)
                | Error::Pipeline(PipelineError::BatchTooLarge { .. })
                | Error::Navigation(NavigationError::InvalidUrl(_))
        )
    }

    /// True if this is (or wraps) a body-wait timeout
    pub fn is_navigation_timeout(&self) -> bool {
        match self {
            Error::Navigation(NavigationError::Timeout(_)) => true,
            Error::Pipeline(PipelineError::GenerationFailed(inner)) => {
                inner.is_navigation_timeout()
            }
            _ => false,
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Deck(DeckError::Container(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_pipeline_messages_match_http_details() {
        assert_eq!(PipelineError::EmptyBatch.to_string(), "No URLs provided");
        let err = PipelineError::BatchTooLarge { max: 20, actual: 21 };
        assert_eq!(err.to_string(), "Maximum 20 URLs allowed");
        let err = PipelineError::GenerationFailed(Box::new(Error::generic("boom")));
        assert_eq!(err.to_string(), "Failed to generate presentation");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::from(PipelineError::EmptyBatch).is_client_error());
        assert!(!Error::from(CaptureError::ScreenshotFailed("x".into())).is_client_error());
    }

    #[test]
    fn test_navigation_timeout_seen_through_wrapper() {
        let inner = Error::from(NavigationError::Timeout(10_000));
        let wrapped = Error::from(PipelineError::GenerationFailed(Box::new(inner)));
        assert!(wrapped.is_navigation_timeout());
        assert!(!Error::generic("nope").is_navigation_timeout());
    }
}
