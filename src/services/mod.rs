//! Media services: catalog listing, object access and uploads.
//!
//! Each service owns an `Arc<dyn ObjectStore>` handed to it at construction.
//! All input validation happens before the store is contacted.

pub mod access_service;
pub mod catalog_service;
pub mod classifier;
pub mod upload_service;

use crate::store::StoreError;
use thiserror::Error;

/// Coarse failure class, used to pick the HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    UpstreamFailure,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Invalid file type. Allowed: PNG, JPG, WAV, FLAC, MP3, PDF, DOCX")]
    UnsupportedFileType,
    #[error("File too large. Maximum size is {}", size_label(.limit_bytes))]
    PayloadTooLarge { limit_bytes: usize },
    #[error("File not found")]
    NotFound(String),
    /// `context` is the client-facing message; `source` stays server-side.
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl MediaError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        MediaError::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::InvalidArgument(_)
            | MediaError::UnsupportedFileType
            | MediaError::PayloadTooLarge { .. } => ErrorKind::InvalidArgument,
            MediaError::NotFound(_) => ErrorKind::NotFound,
            MediaError::Upstream { .. } => ErrorKind::UpstreamFailure,
        }
    }

    /// Classify a store failure for `key`, logging anything that is not a
    /// plain miss.
    pub(crate) fn from_store(
        err: StoreError,
        operation: &'static str,
        key: Option<&str>,
        context: &'static str,
    ) -> Self {
        match err {
            StoreError::NotFound(key) => MediaError::NotFound(key),
            StoreError::InvalidKey => MediaError::invalid("Invalid file name"),
            source => {
                tracing::error!(operation, key = key.unwrap_or("-"), error = %source, "object store call failed");
                MediaError::Upstream { context, source }
            }
        }
    }
}

pub type MediaResult<T> = Result<T, MediaError>;

const MIB: usize = 1024 * 1024;

/// Whole mebibytes print as `N MB`; anything else keeps its byte count.
fn size_label(bytes: &usize) -> String {
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}
