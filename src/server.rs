//! HTTP server assembly
//!
//! ```text
//! GET  /                     index page
//! GET  /static/js/main.js    UI script
//! GET  /static/css/style.css UI styles
//! GET  /api/preview?url=     PNG of one viewport
//! POST /api/generate         .pptx download
//! GET  /health, /status      liveness, counters
//! ```

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::browser::ChromeCapturer;
use crate::config::ServerConfig;
use crate::cors::cors_layer;
use crate::error::Result;
use crate::handlers::{api, status_router, AppState};
use crate::pipeline::DeckPipeline;
use crate::preview::PreviewService;
use crate::retention::RetentionStore;

/// Build the router over `state`
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(api::index_handler))
        .route("/static/js/main.js", get(api::script_handler))
        .route("/static/css/style.css", get(api::style_handler))
        .route("/api/preview", get(api::preview_handler))
        .route("/api/generate", post(api::generate_handler))
        .merge(status_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire the Chrome-backed services described by `config`
pub fn build_state(config: &ServerConfig) -> AppState {
    let capturer = Arc::new(ChromeCapturer::new(config.browser.clone()));
    let retention = RetentionStore::new(config.retention_dir.clone(), config.retention_keep);
    let pipeline = DeckPipeline::new(capturer.clone(), retention).with_max_batch(config.max_batch);
    let previews = PreviewService::new(capturer);
    AppState::new(pipeline, previews)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(build_state(&config));
    let app = router(state, config.body_limit);

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "webdeck listening on http://{} (decks kept in {})",
        listener.local_addr()?,
        config.retention_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
