//! Object store adapters.
//!
//! Every service receives an `Arc<dyn ObjectStore>` at construction time.
//! Production deployments use [`s3::S3Store`]; [`local::LocalStore`] keeps
//! objects on local disk for offline development.

pub mod local;
#[cfg(test)]
pub mod memory;
pub mod s3;

use crate::models::object::{ObjectBody, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use std::{io, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error("invalid object key")]
    InvalidKey,
    #[error("{operation} failed: {message}")]
    Upstream {
        operation: &'static str,
        message: String,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StoreError {
    pub fn upstream(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::Upstream {
            operation,
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Contract consumed from a bucket-style object store.
///
/// Implementations hold no per-request state; every call goes to the store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate every object in the bucket.
    async fn list(&self) -> StoreResult<Vec<StoredObject>>;

    /// Open an object for streaming. Missing keys yield [`StoreError::NotFound`].
    async fn get(&self, key: &str) -> StoreResult<ObjectBody>;

    /// Write an object, replacing any existing object under the same key.
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StoreResult<()>;

    /// Check that an object exists without reading its body.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Issue a time-limited URL granting direct read access to `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StoreResult<String>;

    /// Canonical (non-signed) URL of `key` in this store.
    fn object_url(&self, key: &str) -> String;

    /// Cheap reachability check used by the readiness probe.
    async fn probe(&self) -> StoreResult<()>;
}
