//! S3-compatible object store backend (AWS S3, MinIO, R2, ...).
//!
//! Credentials come from the default AWS provider chain
//! (`AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`, profiles, instance roles).

use super::{ObjectStore, StoreError, StoreResult};
use crate::models::object::{ObjectBody, StoredObject};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::Region,
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::{ByteStream, DateTime as AwsDateTime},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Connection settings for an S3 bucket.
#[derive(Clone, Debug)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services; `None` means AWS.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    settings: S3Settings,
}

impl S3Store {
    /// Build a client from the ambient AWS configuration plus `settings`.
    pub async fn connect(settings: S3Settings) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = settings.endpoint_url.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        builder = builder.force_path_style(settings.force_path_style);

        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = settings.endpoint_url.as_deref().unwrap_or("aws"),
            "S3 client created"
        );

        Self::from_client(Client::from_conf(builder.build()), settings)
    }

    pub fn from_client(client: Client, settings: S3Settings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self) -> StoreResult<Vec<StoredObject>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.settings.bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| {
                StoreError::upstream("ListObjectsV2", DisplayErrorContext(&err).to_string())
            })?;
            for item in page.contents() {
                let Some(key) = item.key() else {
                    continue;
                };
                objects.push(StoredObject {
                    key: key.to_string(),
                    size_bytes: item.size().unwrap_or(0),
                    last_modified: item.last_modified().and_then(to_chrono),
                    content_type: None,
                });
            }
        }

        debug!(count = objects.len(), "listed bucket");
        Ok(objects)
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
        let output = self
            .client
            .get_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(service_err) if service_err.is_no_such_key() => {
                    StoreError::NotFound(key.to_string())
                }
                _ => StoreError::upstream("GetObject", DisplayErrorContext(&err).to_string()),
            })?;

        let content_type = output.content_type().map(str::to_string);
        let content_length = output
            .content_length()
            .and_then(|len| u64::try_from(len).ok());
        debug!(key, ?content_type, ?content_length, "opened object");

        let stream = ReaderStream::new(output.body.into_async_read()).boxed();
        Ok(ObjectBody {
            content_type,
            content_length,
            stream,
        })
    }

    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        let content_md5 = general_purpose::STANDARD.encode(md5::compute(&data).0);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type.map(str::to_string))
            .content_md5(content_md5)
            .send()
            .await
            .map_err(|err| StoreError::upstream("PutObject", DisplayErrorContext(&err).to_string()))?;

        debug!(key, size, "stored object");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(false),
                _ => Err(StoreError::upstream(
                    "HeadObject",
                    DisplayErrorContext(&err).to_string(),
                )),
            },
        }
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StoreResult<String> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StoreError::upstream("PresignGetObject", err.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| {
                StoreError::upstream("PresignGetObject", DisplayErrorContext(&err).to_string())
            })?;

        Ok(request.uri().to_string())
    }

    fn object_url(&self, key: &str) -> String {
        canonical_url(&self.settings, key)
    }

    async fn probe(&self) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.settings.bucket)
            .send()
            .await
            .map_err(|err| StoreError::upstream("HeadBucket", DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}

/// Public URL of `key`: path-style under a custom endpoint, virtual-hosted
/// style on AWS.
fn canonical_url(settings: &S3Settings, key: &str) -> String {
    let key = urlencoding::encode(key);
    match settings.endpoint_url.as_deref() {
        Some(endpoint) => format!(
            "{}/{}/{}",
            endpoint.trim_end_matches('/'),
            settings.bucket,
            key
        ),
        None => format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            settings.bucket, settings.region, key
        ),
    }
}

fn to_chrono(ts: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}
