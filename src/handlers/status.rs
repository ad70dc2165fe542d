//! Health and status endpoints
//!
//! - `/health` - liveness check
//! - `/status` - uptime, generation counters, memory and latency percentiles
//!
//! # Example Response
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "name": "webdeck",
//!   "uptime_seconds": 3600,
//!   "decks_generated": 42,
//!   "previews_served": 120,
//!   "errors": 3,
//!   "memory": { "rss_bytes": 52428800, "virtual_bytes": 268435456 },
//!   "generate_latency": { "p50_ms": 9120.0, "p95_ms": 31000.0, "p99_ms": 44000.0, ... },
//!   "status": "running",
//!   "timestamp": "2026-01-01T12:00:00+00:00"
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, instrument};

use crate::handlers::AppState;

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name from Cargo.toml
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Response Types
// ============================================================================

/// Liveness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" if responding
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Detailed server status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server version
    pub version: String,
    /// Server name
    pub name: String,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Decks successfully generated
    pub decks_generated: u64,
    /// Previews successfully served
    pub previews_served: u64,
    /// Requests that ended in an error response
    pub errors: u64,
    /// Process memory
    pub memory: MemoryMetrics,
    /// Latency of successful `/api/generate` calls
    pub generate_latency: LatencyMetrics,
    /// Always "running" if responding
    pub status: String,
    /// RFC 3339 time the status was produced
    pub timestamp: String,
}

/// Process memory usage from sysinfo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryMetrics {
    /// Resident set size (bytes)
    pub rss_bytes: u64,
    /// Virtual memory size (bytes)
    pub virtual_bytes: u64,
}

/// Latency percentiles in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Median
    pub p50_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
    /// Samples recorded
    pub total_requests: u64,
    /// Mean
    pub mean_ms: f64,
    /// Maximum
    pub max_ms: f64,
}

// ============================================================================
// Latency Histogram
// ============================================================================

/// Thread-safe latency histogram, 1ms to 10 minutes at 3 significant figures.
///
/// Generating a deck takes seconds per URL, so this records milliseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    inner: RwLock<Histogram<u64>>,
}

impl LatencyHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        let histogram =
            Histogram::new_with_bounds(1, 600_000, 3).expect("Failed to create histogram");
        Self {
            inner: RwLock::new(histogram),
        }
    }

    /// Record a duration; values out of bounds are clamped
    pub fn record(&self, duration: Duration) {
        let ms = (duration.as_millis() as u64).clamp(1, 600_000);
        let _ = self.inner.write().record(ms);
    }

    /// Number of samples
    pub fn count(&self) -> u64 {
        self.inner.read().len()
    }

    /// Snapshot as percentiles
    pub fn metrics(&self) -> LatencyMetrics {
        let hist = self.inner.read();
        if hist.is_empty() {
            return LatencyMetrics::default();
        }
        LatencyMetrics {
            p50_ms: hist.value_at_percentile(50.0) as f64,
            p95_ms: hist.value_at_percentile(95.0) as f64,
            p99_ms: hist.value_at_percentile(99.0) as f64,
            total_requests: hist.len(),
            mean_ms: hist.mean(),
            max_ms: hist.max() as f64,
        }
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Request counters shared by all handlers
#[derive(Debug)]
pub struct ServerStats {
    start_time: Instant,
    decks_generated: AtomicU64,
    previews_served: AtomicU64,
    errors: AtomicU64,
    generate_latency: LatencyHistogram,
}

impl ServerStats {
    /// Fresh counters starting now
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            decks_generated: AtomicU64::new(0),
            previews_served: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            generate_latency: LatencyHistogram::new(),
        }
    }

    /// Seconds since start
    #[inline]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Count a generated deck and its latency
    pub fn record_generation(&self, elapsed: Duration) -> u64 {
        self.generate_latency.record(elapsed);
        self.decks_generated.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a served preview
    #[inline]
    pub fn record_preview(&self) -> u64 {
        self.previews_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count an error response
    #[inline]
    pub fn record_error(&self) -> u64 {
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decks generated so far
    #[inline]
    pub fn decks_generated(&self) -> u64 {
        self.decks_generated.load(Ordering::Relaxed)
    }

    /// Previews served so far
    #[inline]
    pub fn previews_served(&self) -> u64 {
        self.previews_served.load(Ordering::Relaxed)
    }

    /// Error responses so far
    #[inline]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Generation latency snapshot
    pub fn generate_latency(&self) -> LatencyMetrics {
        self.generate_latency.metrics()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_memory_metrics() -> MemoryMetrics {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

    match system.process(pid) {
        Some(process) => MemoryMetrics {
            rss_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
        },
        None => {
            debug!("Could not find current process in sysinfo");
            MemoryMetrics::default()
        }
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// `GET /health`
#[instrument(skip_all)]
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// `GET /status`
#[instrument(skip_all)]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Status check requested");
    let stats = &state.stats;

    let response = StatusResponse {
        version: SERVER_VERSION.to_string(),
        name: SERVER_NAME.to_string(),
        uptime_seconds: stats.uptime_seconds(),
        decks_generated: stats.decks_generated(),
        previews_served: stats.previews_served(),
        errors: stats.errors(),
        memory: collect_memory_metrics(),
        generate_latency: stats.generate_latency(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// Routes for `/health` and `/status`
pub fn status_router() -> axum::Router<Arc<AppState>> {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
}
