//! Upload request and result types.

use bytes::Bytes;

/// A file received from a client, held fully in memory until validated.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Outcome of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Canonical store URL of the written object.
    pub file_url: String,
    /// MIME type declared by the client (`application/octet-stream` if none).
    pub file_type: String,
}
