//! S3-compatible storage client

use crate::{Presigner, StorageConfig};
use async_trait::async_trait;
use chrono::Utc;
use obra_errors::{AppError, AppResult};
use obra_ports::{ObjectStorage, StoredObject};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info};

/// Object storage backed by an S3-compatible endpoint
pub struct S3Storage {
    presigner: Presigner,
    http: reqwest::Client,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let presigner = Presigner::new(
            &config.endpoint,
            &config.region,
            &config.bucket,
            &config.access_key,
            config.secret_key.expose_secret(),
        )?;

        Ok(Self {
            presigner,
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> AppResult<StoredObject> {
        let size_bytes = body.len() as i64;
        // Uploads go through a short-lived presigned PUT
        let url = self
            .presigner
            .presign("PUT", key, Duration::from_secs(300), Utc::now())?;

        debug!(key = %key, size_bytes, "Uploading object");

        let response = self
            .http
            .put(url)
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Storage upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Storage upload rejected: HTTP {}",
                response.status()
            )));
        }

        info!(key = %key, size_bytes, "Object stored");

        Ok(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
        })
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        let url = self
            .presigner
            .presign("DELETE", key, Duration::from_secs(300), Utc::now())?;

        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Storage delete failed: {}", e)))?;

        // Missing objects are treated as already deleted
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(AppError::external_service(format!(
                "Storage delete rejected: HTTP {}",
                response.status()
            )));
        }

        info!(key = %key, "Object deleted");
        Ok(())
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        self.presigner.presign("GET", key, expires_in, Utc::now())
    }
}
