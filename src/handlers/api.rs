//! UI and API handlers
//!
//! - `GET /` and `/static/*` - the embedded single-page UI
//! - `GET /api/preview?url=` - one viewport screenshot as PNG
//! - `POST /api/generate` - multipart or JSON batch, answers with the deck
//!
//! Every error body is `{"detail": "<message>"}`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{error, info, instrument, warn};

use crate::deck::PPTX_MIME_TYPE;
use crate::error::{Error, NavigationError, PipelineError};
use crate::handlers::AppState;
use crate::pipeline::CaptureRequestItem;

/// Detail returned for any failed generation
pub const GENERATION_FAILED: &str = "Failed to generate presentation";

/// `Content-Disposition` of a generated deck
pub const DECK_DISPOSITION: &str = "attachment; filename=\"presentation.pptx\"";

const INDEX_HTML: &str = include_str!("../../static/index.html");
const MAIN_JS: &str = include_str!("../../static/js/main.js");
const STYLE_CSS: &str = include_str!("../../static/css/style.css");

// ============================================================================
// Errors
// ============================================================================

/// An HTTP error with a client-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Response status
    #[serde(skip)]
    pub status: StatusCode,
    /// Message shown to the client
    pub detail: String,
}

impl ApiError {
    /// Error with an explicit status
    pub fn new<S: Into<String>>(status: StatusCode, detail: S) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// 400
    pub fn bad_request<S: Into<String>>(detail: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// 500
    pub fn internal<S: Into<String>>(detail: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Map a generate failure: batch-size problems are the caller's fault and
    /// keep their message, everything else collapses to one generic line.
    pub fn from_generate(err: &Error) -> Self {
        match err {
            Error::Pipeline(e @ (PipelineError::EmptyBatch | PipelineError::BatchTooLarge { .. })) => {
                Self::bad_request(e.to_string())
            }
            _ => Self::internal(GENERATION_FAILED),
        }
    }

    /// Map a preview failure to a 500 with a short reason
    pub fn from_preview(err: &Error) -> Self {
        if err.is_navigation_timeout() {
            return Self::internal("Failed to load webpage");
        }
        match err {
            Error::Navigation(e @ NavigationError::InvalidUrl(_)) => Self::internal(e.to_string()),
            _ => Self::internal("Failed to capture screenshot"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// JSON form of a generate request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerateRequest {
    /// Batch entries, in slide order
    pub urls: Vec<UrlData>,
}

/// One JSON batch entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlData {
    /// Page to capture
    pub url: String,
    /// Cropped image as a `data:image/...;base64,` URL (or bare base64)
    #[serde(rename = "croppedImage", default, skip_serializing_if = "Option::is_none")]
    pub cropped_image: Option<String>,
}

impl GenerateRequest {
    /// Decode into pipeline items
    pub fn into_items(self) -> Result<Vec<CaptureRequestItem>, ApiError> {
        self.urls
            .into_iter()
            .map(|entry| {
                let cropped = match entry.cropped_image.as_deref() {
                    Some(data) if !data.trim().is_empty() => Some(decode_data_url(data)?),
                    _ => None,
                };
                Ok(CaptureRequestItem {
                    url: entry.url,
                    cropped_image: cropped,
                })
            })
            .collect()
    }
}

/// Decode a base64 data URL, or bare base64, into bytes
pub fn decode_data_url(data: &str) -> Result<Vec<u8>, ApiError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((_, payload)) => payload,
            None => return Err(ApiError::bad_request("Invalid cropped image")),
        },
        None => data,
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::bad_request("Invalid cropped image"))
}

/// A `cropped_images` multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-supplied file name
    pub file_name: Option<String>,
    /// File contents
    pub data: Vec<u8>,
}

fn indexed_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^screenshot_(\d+)\.\w+$").expect("valid regex"))
}

/// Pair uploaded crops with URLs.
///
/// The UI names each crop `screenshot_<url index>.png`. When every non-empty
/// upload carries such a name, and every index is in range, crops go to
/// those indices. Otherwise the n-th upload belongs to the n-th URL. Empty
/// uploads never count as a crop.
pub fn align_cropped_images(url_count: usize, uploads: Vec<Upload>) -> Vec<Option<Vec<u8>>> {
    let mut aligned: Vec<Option<Vec<u8>>> = vec![None; url_count];

    let indices: Option<Vec<usize>> = uploads
        .iter()
        .filter(|u| !u.data.is_empty())
        .map(|u| {
            let name = u.file_name.as_deref()?;
            let caps = indexed_name_pattern().captures(name)?;
            caps[1].parse::<usize>().ok().filter(|i| *i < url_count)
        })
        .collect();

    match indices {
        Some(indices) => {
            let uploads = uploads.into_iter().filter(|u| !u.data.is_empty());
            for (index, upload) in indices.into_iter().zip(uploads) {
                aligned[index] = Some(upload.data);
            }
        }
        None => {
            for (slot, upload) in aligned.iter_mut().zip(uploads) {
                if !upload.data.is_empty() {
                    *slot = Some(upload.data);
                }
            }
        }
    }
    aligned
}

/// A generate batch read from either a multipart form or a JSON body
#[derive(Debug)]
pub struct GenerateForm(pub Vec<CaptureRequestItem>);

#[axum::async_trait]
impl<S> FromRequest<S> for GenerateForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            return read_multipart(multipart).await.map(GenerateForm);
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<GenerateRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            return body.into_items().map(GenerateForm);
        }

        Err(ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected multipart/form-data or application/json",
        ))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Vec<CaptureRequestItem>, ApiError> {
    let mut urls = Vec::new();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("urls") => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                urls.push(url);
            }
            Some("cropped_images") => {
                let file_name = field.file_name().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                uploads.push(Upload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            other => warn!("Ignoring unexpected form field {:?}", other),
        }
    }

    let crops = align_cropped_images(urls.len(), uploads);
    Ok(urls
        .into_iter()
        .zip(crops)
        .map(|(url, cropped_image)| CaptureRequestItem { url, cropped_image })
        .collect())
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /`
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /static/js/main.js`
pub async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        MAIN_JS,
    )
}

/// `GET /static/css/style.css`
pub async fn style_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

/// Query string of `/api/preview`
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewQuery {
    /// Page to capture
    pub url: Option<String>,
}

/// `GET /api/preview?url=`
#[instrument(skip_all, fields(url = ?query.url))]
pub async fn preview_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, ApiError> {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        state.stats.record_error();
        return Err(ApiError::bad_request("No URL provided"));
    };

    match state.previews.preview(&url).await {
        Ok(preview) => {
            state.stats.record_preview();
            Ok(([(header::CONTENT_TYPE, "image/png")], preview.data).into_response())
        }
        Err(e) => {
            error!("Error generating preview: {}", e);
            state.stats.record_error();
            Err(ApiError::from_preview(&e))
        }
    }
}

/// `POST /api/generate`
#[instrument(skip_all)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    form: Result<GenerateForm, ApiError>,
) -> Result<Response, ApiError> {
    let GenerateForm(items) = form.map_err(|e| {
        state.stats.record_error();
        e
    })?;

    let started = Instant::now();
    let deck = state.pipeline.generate(items).await.map_err(|e| {
        state.stats.record_error();
        ApiError::from_generate(&e)
    })?;

    let elapsed = started.elapsed();
    state.stats.record_generation(elapsed);
    info!(
        "Served {} ({} slides, {} bytes) in {:?}",
        deck.path.display(),
        deck.slide_count,
        deck.data.len(),
        elapsed
    );

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_MIME_TYPE),
            (header::CONTENT_DISPOSITION, DECK_DISPOSITION),
        ],
        deck.data,
    )
        .into_response())
}
