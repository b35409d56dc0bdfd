//! Object storage port

use async_trait::async_trait;
use obra_errors::AppResult;
use std::time::Duration;

/// A stored object's metadata as known to the application
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Object storage interface (S3-compatible backends)
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload an object under `key`
    async fn put_object(&self, key: &str, content_type: &str, body: Vec<u8>)
        -> AppResult<StoredObject>;

    /// Delete an object
    async fn delete_object(&self, key: &str) -> AppResult<()>;

    /// Presigned URL for downloading an object, valid for `expires_in`
    fn presign_get(&self, key: &str, expires_in: Duration) -> AppResult<String>;
}
