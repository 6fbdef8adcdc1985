//! Upload validation and write-through to the object store.

use super::{MediaError, MediaResult, classifier::is_upload_allowed};
use crate::{
    models::upload::{UploadReceipt, UploadRequest},
    store::ObjectStore,
};
use std::sync::Arc;
use tracing::info;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    max_upload_bytes: usize,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Validate and store `file` under its original name.
    ///
    /// Checks run in order: presence, type allow-list, size. An existing
    /// object with the same name is overwritten without warning.
    pub async fn upload(&self, file: Option<UploadRequest>) -> MediaResult<UploadReceipt> {
        let file = file.ok_or_else(missing_file)?;

        check_declared(&file.file_name, file.content_type.as_deref())?;
        if file.data.len() > self.max_upload_bytes {
            return Err(self.too_large());
        }

        let file_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| FALLBACK_MIME.to_string());
        let size = file.data.len();

        self.store
            .put(&file.file_name, file.data, file.content_type.as_deref())
            .await
            .map_err(|err| {
                MediaError::from_store(err, "put", Some(&file.file_name), "Internal server error")
            })?;

        info!(file = %file.file_name, size, %file_type, "file uploaded");
        Ok(UploadReceipt {
            file_url: self.store.object_url(&file.file_name),
            file_type,
        })
    }

    pub(crate) fn too_large(&self) -> MediaError {
        MediaError::PayloadTooLarge {
            limit_bytes: self.max_upload_bytes,
        }
    }
}

/// Presence and type checks that only need the part headers, so callers can
/// reject a file before reading its body.
pub fn check_declared(file_name: &str, content_type: Option<&str>) -> MediaResult<()> {
    if file_name.is_empty() {
        return Err(missing_file());
    }
    if !is_upload_allowed(file_name, content_type) {
        return Err(MediaError::UnsupportedFileType);
    }
    Ok(())
}

fn missing_file() -> MediaError {
    MediaError::invalid("File upload failed or invalid file type.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::media::MediaCategory,
        services::{ErrorKind, catalog_service::CatalogService},
        store::memory::MemoryStore,
    };
    use bytes::Bytes;

    fn request(name: &str, mime: Option<&str>, len: usize) -> Option<UploadRequest> {
        Some(UploadRequest {
            file_name: name.to_string(),
            content_type: mime.map(str::to_string),
            data: Bytes::from(vec![0u8; len]),
        })
    }

    #[tokio::test]
    async fn accepts_small_jpeg() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), DEFAULT_MAX_UPLOAD_BYTES);

        let receipt = uploads
            .upload(request("photo.jpg", Some("image/jpeg"), 1024))
            .await
            .unwrap();
        assert_eq!(receipt.file_type, "image/jpeg");
        assert_eq!(receipt.file_url, "https://memory.test/photo.jpg");
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn rejects_executable() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), DEFAULT_MAX_UPLOAD_BYTES);

        let err = uploads
            .upload(request("setup.exe", Some("application/octet-stream"), 10))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFileType));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_oversize_file() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), DEFAULT_MAX_UPLOAD_BYTES);

        let err = uploads
            .upload(request("big.jpg", Some("image/jpeg"), 11 * 1024 * 1024))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MediaError::PayloadTooLarge { limit_bytes } if limit_bytes == DEFAULT_MAX_UPLOAD_BYTES
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn exactly_at_limit_is_accepted() {
        let uploads = UploadService::new(Arc::new(MemoryStore::default()), 64);
        uploads
            .upload(request("tiny.png", None, 64))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_invalid() {
        let uploads = UploadService::new(Arc::new(MemoryStore::default()), DEFAULT_MAX_UPLOAD_BYTES);
        for file in [None, request("", Some("image/png"), 1)] {
            let err = uploads.upload(file).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[tokio::test]
    async fn mime_alone_is_enough() {
        let uploads = UploadService::new(Arc::new(MemoryStore::default()), DEFAULT_MAX_UPLOAD_BYTES);
        let receipt = uploads
            .upload(request("recording", Some("audio/x-wav"), 5))
            .await
            .unwrap();
        assert_eq!(receipt.file_type, "audio/x-wav");
    }

    #[tokio::test]
    async fn undeclared_mime_reports_octet_stream() {
        let uploads = UploadService::new(Arc::new(MemoryStore::default()), DEFAULT_MAX_UPLOAD_BYTES);
        let receipt = uploads.upload(request("doc.pdf", None, 5)).await.unwrap();
        assert_eq!(receipt.file_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn uploaded_file_appears_in_catalog() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), DEFAULT_MAX_UPLOAD_BYTES);
        let catalog = CatalogService::new(store);

        uploads
            .upload(request("Track.FLAC", Some("audio/flac"), 3))
            .await
            .unwrap();
        let entries = catalog.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Track.FLAC");
        assert_eq!(entries[0].category, MediaCategory::Audio);
    }

    #[test]
    fn declared_checks_run_presence_then_type() {
        let err = check_declared("", Some("application/x-msdownload")).unwrap_err();
        assert!(matches!(err, MediaError::InvalidArgument(_)));

        let err = check_declared("setup.exe", Some("application/octet-stream")).unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFileType));

        check_declared("scan.pdf", None).unwrap();
    }

    #[tokio::test]
    async fn oversize_file_of_bad_type_reports_type() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), 16);

        let err = uploads
            .upload(request("setup.exe", Some("application/octet-stream"), 4096))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFileType));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn same_name_overwrites() {
        let store = Arc::new(MemoryStore::default());
        let uploads = UploadService::new(store.clone(), DEFAULT_MAX_UPLOAD_BYTES);
        let catalog = CatalogService::new(store);

        uploads.upload(request("a.png", None, 1)).await.unwrap();
        uploads.upload(request("a.png", None, 2)).await.unwrap();
        let entries = catalog.list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, 2);
    }

    #[tokio::test]
    async fn store_failure_is_opaque() {
        let uploads = UploadService::new(Arc::new(MemoryStore::failing()), DEFAULT_MAX_UPLOAD_BYTES);
        let err = uploads
            .upload(request("a.png", Some("image/png"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
