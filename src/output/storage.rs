//! Object storage upload (S3, R2, GCS, Azure, local)

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Build a Hive-style partitioned key for an endpoint
///
/// Format: `{endpoint}/dt={YYYY-MM-DD}/data.{ext}`
pub fn default_key(endpoint: &str, extension: &str) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    format!("{endpoint}/dt={date}/data.{extension}")
}

/// Destination for finished output files
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload `local_file` under `key`, replacing any existing object.
    /// Returns the URI of the stored object.
    async fn put(&self, local_file: &Path, key: &str) -> Result<String>;
}

#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn put(&self, local_file: &Path, key: &str) -> Result<String> {
        (**self).put(local_file, key).await
    }
}

/// [`Storage`] over an `object_store` backend, parsed from a URL
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the bucket/container
    prefix: String,
    /// URI root used when reporting stored objects
    root: String,
}

impl ObjectStorage {
    /// Parse a destination URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::s3(rest, "s3")
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::s3(rest, "r2")
        } else if let Some(rest) = url.strip_prefix("gs://") {
            let (bucket, prefix) = split_bucket(rest);
            let store = GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(|e| Error::storage(format!("Failed to create GCS client: {e}")))?;
            Ok(Self::from_store(Arc::new(store), prefix, format!("gs://{bucket}")))
        } else if let Some(rest) = url.strip_prefix("az://") {
            let (container, prefix) = split_bucket(rest);
            let store = MicrosoftAzureBuilder::from_env()
                .with_container_name(container)
                .build()
                .map_err(|e| Error::storage(format!("Failed to create Azure client: {e}")))?;
            Ok(Self::from_store(Arc::new(store), prefix, format!("az://{container}")))
        } else {
            Self::local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// Wrap an existing object store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
            root: root.into().trim_end_matches('/').to_string(),
        }
    }

    fn s3(rest: &str, scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest);
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
        if scheme == "r2" {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::storage(format!("Failed to create {scheme} client: {e}")))?;
        Ok(Self::from_store(
            Arc::new(store),
            prefix,
            format!("{scheme}://{bucket}"),
        ))
    }

    fn local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::storage(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::storage(format!("Failed to create local store: {e}")))?;
        let root = std::fs::canonicalize(path)
            .map(|p| format!("file://{}", p.display()))
            .unwrap_or_else(|_| format!("file://{path}"));

        Ok(Self::from_store(Arc::new(store), "", root))
    }

    /// Whether this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        !self.root.starts_with("file://")
    }

    fn object_path(&self, key: &str) -> ObjectPath {
        let key = key.trim_start_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(key)
        } else {
            ObjectPath::from(format!("{}/{key}", self.prefix))
        }
    }
}

#[async_trait]
impl Storage for ObjectStorage {
    async fn put(&self, local_file: &Path, key: &str) -> Result<String> {
        let data = Bytes::from(tokio::fs::read(local_file).await?);
        let size = data.len();
        let path = self.object_path(key);

        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::storage(format!("Failed to write {path}: {e}")))?;

        let uri = format!("{}/{path}", self.root);
        info!(uri = %uri, bytes = size, "Uploaded output");
        Ok(uri)
    }
}

/// Split `bucket/prefix/...` into bucket and prefix
fn split_bucket(rest: &str) -> (&str, &str) {
    match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    }
}
