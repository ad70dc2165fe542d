//! CORS policy for the HTTP service
//!
//! The UI is served from the same origin, so cross-origin callers are only
//! expected during local development. Allowed:
//!
//! - **Origins**: `localhost`, `127.0.0.1` and `[::1]` on any port
//! - **Methods**: GET, POST, OPTIONS
//! - **Headers**: Content-Type
//! - **Exposed**: Content-Disposition, so scripts can read the deck file name

use http::header::{HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::Method;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Request headers a cross-origin caller may send
pub const ALLOWED_HEADERS: [HeaderName; 1] = [CONTENT_TYPE];

/// Methods a cross-origin caller may use
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Preflight cache lifetime
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Localhost-only CORS layer
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            is_localhost_origin(origin)
        }))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
}

/// True if `origin` is `http(s)://<loopback>[:port]`
///
/// ```
/// use http::HeaderValue;
/// use webdeck::cors::is_localhost_origin;
///
/// assert!(is_localhost_origin(&HeaderValue::from_static("http://localhost:8000")));
/// assert!(!is_localhost_origin(&HeaderValue::from_static("http://localhost.evil.com")));
/// ```
pub fn is_localhost_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let origin = origin.to_ascii_lowercase();

    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    LOOPBACK_HOSTS.iter().any(|host| match rest.strip_prefix(host) {
        Some("") => true,
        Some(tail) => tail
            .strip_prefix(':')
            .is_some_and(|port| port.parse::<u16>().is_ok()),
        None => false,
    })
}
