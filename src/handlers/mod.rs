//! HTTP handlers
//!
//! - [`api`] - UI assets, `/api/preview`, `/api/generate`
//! - [`status`] - `/health`, `/status`

pub mod api;
pub mod status;

pub use api::{ApiError, GenerateRequest, UrlData};
pub use status::{status_router, ServerStats};

use crate::pipeline::DeckPipeline;
use crate::preview::PreviewService;

/// State shared by every handler
pub struct AppState {
    /// Batch generation
    pub pipeline: DeckPipeline,
    /// Single-URL previews
    pub previews: PreviewService,
    /// Request counters
    pub stats: ServerStats,
}

impl AppState {
    /// Bundle the services with fresh counters
    pub fn new(pipeline: DeckPipeline, previews: PreviewService) -> Self {
        Self {
            pipeline,
            previews,
            stats: ServerStats::new(),
        }
    }
}
