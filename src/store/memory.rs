//! In-memory store for tests.

use super::{ObjectStore, StoreError, StoreResult};
use crate::models::object::{ObjectBody, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use std::{
    collections::BTreeMap,
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, (StoredObject, Bytes)>>,
    /// Number of store calls made, so tests can assert none happened.
    pub calls: AtomicUsize,
    /// When set, every call fails with an upstream error.
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Seed an object with an explicit store-reported content type.
    pub fn insert(&self, key: &str, data: &'static [u8], content_type: Option<&str>) {
        let object = StoredObject {
            key: key.to_string(),
            size_bytes: data.len() as i64,
            last_modified: Some(Utc::now()),
            content_type: content_type.map(str::to_string),
        };
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (object, Bytes::from_static(data)));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, operation: &'static str) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::upstream(operation, "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<StoredObject>> {
        self.enter("list")?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .map(|(object, _)| object.clone())
            .collect())
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
        self.enter("get")?;
        let (object, data) = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(ObjectBody {
            content_type: object.content_type,
            content_length: Some(data.len() as u64),
            stream: futures::stream::once(async move { Ok::<_, io::Error>(data) }).boxed(),
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        self.enter("put")?;
        let object = StoredObject {
            key: key.to_string(),
            size_bytes: data.len() as i64,
            last_modified: Some(Utc::now()),
            content_type: content_type.map(str::to_string),
        };
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (object, data));
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.enter("exists")?;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StoreResult<String> {
        self.enter("presign")?;
        Ok(format!(
            "https://memory.test/{}?X-Amz-Expires={}",
            urlencoding::encode(key),
            expires_in.as_secs()
        ))
    }

    fn object_url(&self, key: &str) -> String {
        format!("https://memory.test/{}", urlencoding::encode(key))
    }

    async fn probe(&self) -> StoreResult<()> {
        self.enter("probe")
    }
}
