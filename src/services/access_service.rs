//! Single-object access: pre-signed download links and direct streaming.

use super::{MediaError, MediaResult, classifier::content_type_override};
use crate::{models::object::ObjectBody, store::ObjectStore};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Lifetime of a pre-signed download link.
pub const DOWNLOAD_LINK_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    pub expires_in: Duration,
}

/// An object ready to be relayed to a client, with its resolved headers.
#[derive(Debug)]
pub struct MediaStream {
    /// `None` when neither the override table nor the store supplied one.
    pub content_type: Option<String>,
    pub content_disposition: String,
    pub content_length: Option<u64>,
    pub body: ObjectBody,
}

#[derive(Clone)]
pub struct AccessService {
    store: Arc<dyn ObjectStore>,
}

impl AccessService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Time-limited direct URL for `filename`.
    ///
    /// The object is checked first so a missing key surfaces as `NotFound`
    /// instead of a link that fails later.
    pub async fn download_link(&self, filename: &str) -> MediaResult<DownloadLink> {
        let filename = require_filename(filename)?;
        const CONTEXT: &str = "Failed to generate download URL";

        let exists = self
            .store
            .exists(filename)
            .await
            .map_err(|err| MediaError::from_store(err, "exists", Some(filename), CONTEXT))?;
        if !exists {
            return Err(MediaError::NotFound(filename.to_string()));
        }

        let url = self
            .store
            .presign_get(filename, DOWNLOAD_LINK_TTL)
            .await
            .map_err(|err| MediaError::from_store(err, "presign", Some(filename), CONTEXT))?;

        Ok(DownloadLink {
            url,
            expires_in: DOWNLOAD_LINK_TTL,
        })
    }

    /// Open `filename` for relaying. Nothing is buffered: the returned body
    /// pulls from the store as the client reads.
    pub async fn stream_object(
        &self,
        filename: &str,
        as_attachment: bool,
    ) -> MediaResult<MediaStream> {
        let filename = require_filename(filename)?;
        debug!(filename, as_attachment, "streaming file");

        let body = self.store.get(filename).await.map_err(|err| {
            MediaError::from_store(err, "get", Some(filename), "Failed to stream file")
        })?;

        Ok(MediaStream {
            content_type: resolve_content_type(filename, body.content_type.as_deref()),
            content_disposition: content_disposition(filename, as_attachment),
            content_length: body.content_length,
            body,
        })
    }
}

fn require_filename(filename: &str) -> MediaResult<&str> {
    if filename.is_empty() {
        return Err(MediaError::invalid("Filename is required"));
    }
    Ok(filename)
}

/// Override table first, then whatever the store reported.
pub fn resolve_content_type(filename: &str, reported: Option<&str>) -> Option<String> {
    content_type_override(filename)
        .map(str::to_string)
        .or_else(|| reported.filter(|t| !t.is_empty()).map(str::to_string))
}

/// `attachment` or `inline` disposition carrying the filename. Names outside
/// printable ASCII get an RFC 5987 `filename*` alongside an ASCII fallback.
pub fn content_disposition(filename: &str, as_attachment: bool) -> String {
    let kind = if as_attachment { "attachment" } else { "inline" };
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("{}; filename=\"{}\"", kind, fallback)
    } else {
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            kind,
            fallback,
            urlencoding::encode(filename)
        )
    }
}
