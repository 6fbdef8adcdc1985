//! HTTP handlers for catalog listing, search, download links and streaming.
//! Object bodies are relayed as a stream, never buffered.

use crate::{errors::AppError, models::media::MediaEntry, state::AppState};
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MediaListResponse {
    pub media: Vec<MediaEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: String,
    /// Seconds until `download_url` stops working.
    pub expires_in: u64,
}

/// Query params accepted by `GET /api/media/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

/// Query params accepted by `GET /api/media/stream/{filename}`.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub download: Option<String>,
}

/// `GET /api/media`
pub async fn list_media(
    State(state): State<AppState>,
) -> Result<Json<MediaListResponse>, AppError> {
    let media = state.catalog.list_all().await?;
    Ok(Json(MediaListResponse { media }))
}

/// `GET /api/media/type/{media_type}`
pub async fn list_media_by_type(
    State(state): State<AppState>,
    Path(media_type): Path<String>,
) -> Result<Json<MediaListResponse>, AppError> {
    let media = state.catalog.list_by_type(&media_type).await?;
    Ok(Json(MediaListResponse { media }))
}

/// `GET /api/media/search?query=&type=`
pub async fn search_media(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<MediaListResponse>, AppError> {
    let media = state
        .catalog
        .search(q.query.as_deref(), q.media_type.as_deref())
        .await?;
    Ok(Json(MediaListResponse { media }))
}

/// `GET /api/media/download/{*filename}` - pre-signed link, valid 15 minutes.
pub async fn download_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let link = state.access.download_link(&filename).await?;
    Ok(Json(DownloadResponse {
        download_url: link.url,
        expires_in: link.expires_in.as_secs(),
    }))
}

/// `GET /api/media/stream/{*filename}?download=true|false`
///
/// Dropping the response (client gone) drops the upstream read with it.
pub async fn stream_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(q): Query<StreamQuery>,
) -> Result<Response, AppError> {
    let as_attachment = q.download.as_deref() == Some("true");
    let media = state.access.stream_object(&filename, as_attachment).await?;

    let mut response = Response::new(Body::from_stream(media.body.stream));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Some(value) = media
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&media.content_disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(len) = media.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    set_playback_cors_headers(headers);

    Ok(response)
}

/// Lets pages on any origin embed or play the stream.
fn set_playback_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}
