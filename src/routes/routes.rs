//! Defines routes for the media API.
//!
//! ## Structure
//! - **Catalog endpoints** (mounted under `/api/media`)
//!   - `GET /`                      - list everything
//!   - `GET /type/{media_type}`     - list one category (`audio|pdf|image|all`)
//!   - `GET /search?query=&type=`   - case-insensitive name search
//!
//! - **Object endpoints**
//!   - `GET  /api/media/download/{*filename}` - pre-signed download link
//!   - `GET  /api/media/stream/{*filename}`   - relay bytes (`?download=true` for attachment)
//!   - `POST /api/upload`                     - multipart upload, field `file`
//!
//! The wildcard `*filename` allows keys containing `/`. Unmatched paths get a
//! JSON 404 like every other error.

use crate::{
    errors::AppError,
    handlers::{
        health_handlers::{healthz, index, readyz},
        media_handlers::{
            download_media, list_media, list_media_by_type, search_media, stream_media,
        },
        upload_handlers::upload_file,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the router for all media routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let media = Router::new()
        .route("/", get(list_media))
        .route("/type/{media_type}", get(list_media_by_type))
        .route("/search", get(search_media))
        .route("/download/{*filename}", get(download_media))
        .route("/stream/{*filename}", get(stream_media));

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/media", media)
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "Not found")
}

/// Full application: routes, state, CORS and request tracing.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    let max_upload_bytes = state.uploads.max_upload_bytes();
    routes(max_upload_bytes)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin `{}`", origin);
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(AllowOrigin::list(origins))
}
