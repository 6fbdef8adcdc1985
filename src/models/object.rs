//! Represents an object (file) held by the backing object store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use sqlx::FromRow;
use std::{fmt, io};

/// A single object as reported by a store listing.
///
/// Owned by the object store; this service never mutates one in place.
/// Identity is the key: no two objects share a key.
#[derive(Clone, FromRow, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key (the original filename for uploads made through this service).
    pub key: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// Timestamp when the object was last written, if the store reports it.
    pub last_modified: Option<DateTime<Utc>>,

    /// Content type recorded by the store at write time.
    pub content_type: Option<String>,
}

/// An object body opened for reading.
///
/// The stream is lazy: nothing beyond the first chunk is pulled from the
/// store until the consumer polls it, and dropping it aborts the read.
pub struct ObjectBody {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub stream: BoxStream<'static, io::Result<Bytes>>,
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
