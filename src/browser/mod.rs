//! Browser automation module
//!
//! Headless Chrome through ChromiumOxide: session lifecycle, navigation
//! with a body-presence wait, and screenshot capture.

pub mod capture;
pub mod controller;
pub mod navigation;

pub use capture::{
    scroll_offsets, Capturer, ChromeCapturer, FixedDelay, Settle, RENDER_SETTLE, SCROLL_SETTLE,
};
pub use controller::{BrowserConfig, BrowserConfigBuilder, BrowserSession};
pub use navigation::{PageNavigator, UrlValidator};
