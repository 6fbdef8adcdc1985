//! `POST /api/upload`: reads the multipart `file` field into memory and hands
//! it to the upload service. Name and type are checked from the part headers
//! before the body is read.

use crate::{
    errors::AppError, models::upload::UploadRequest, services::upload_service::check_declared,
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::Serialize;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_type: String,
    pub file_url: String,
}

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(&state, err))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        tracing::debug!(%file_name, ?content_type, "processing upload field");
        check_declared(&file_name, content_type.as_deref())?;

        let data = field
            .bytes()
            .await
            .map_err(|err| multipart_error(&state, err))?;
        file = Some(UploadRequest {
            file_name,
            content_type,
            data,
        });
        break;
    }

    let receipt = state.uploads.upload(file).await?;
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".into(),
        file_type: receipt.file_type,
        file_url: receipt.file_url,
    }))
}

/// Body-limit trips surface as the same payload-too-large error the service
/// raises; everything else is a malformed request.
fn multipart_error(state: &AppState, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        state.uploads.too_large().into()
    } else {
        err.into()
    }
}
