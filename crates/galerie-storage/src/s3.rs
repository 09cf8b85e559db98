use crate::keys;
use crate::traits::{BlobStore, StorageError, StorageResult, StoredBlob};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use galerie_core::models::OwnerScope;
use galerie_core::StorageBackend;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore as _, ObjectStoreExt, PutPayload, Result as ObjectResult};

/// S3 blob store implementation
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for an S3 object.
    ///
    /// For AWS S3, the standard virtual-hosted format; for S3-compatible
    /// providers, path-style against the custom endpoint.
    fn generate_locator(&self, blob_id: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, blob_id)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, blob_id
            )
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(
        &self,
        scope: &OwnerScope,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredBlob> {
        if data.is_empty() {
            return Err(StorageError::PayloadRejected(
                "Buffer is empty".to_string(),
            ));
        }

        let blob_id = keys::generate_blob_key(scope, content_type);
        let size = data.len() as u64;
        let location = Path::from(blob_id.clone());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                blob_id = %blob_id,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::Unavailable(e.to_string())
        })?;

        let locator = self.generate_locator(&blob_id);

        tracing::info!(
            bucket = %self.bucket,
            blob_id = %blob_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredBlob { locator, blob_id })
    }

    async fn delete(&self, blob_id: &str) -> StorageResult<bool> {
        let location = Path::from(blob_id.to_string());

        // S3 DeleteObject succeeds for missing keys, so probe first to keep
        // the idempotent contract observable.
        match self.store.head(&location).await {
            Err(ObjectStoreError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(StorageError::Unavailable(e.to_string())),
            Ok(_) => {}
        }

        let result: ObjectResult<_> = self.store.delete(&location).await;
        match result {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, blob_id = %blob_id, "S3 delete successful");
                Ok(true)
            }
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, bucket = %self.bucket, blob_id = %blob_id, "S3 delete failed");
                Err(StorageError::Unavailable(e.to_string()))
            }
        }
    }

    async fn delete_scope(&self, scope: &OwnerScope) -> StorageResult<()> {
        let prefix = Path::from(keys::scope_prefix(scope));
        let mut listing = self.store.list(Some(&prefix));
        let mut deleted = 0usize;

        while let Some(meta) = listing.next().await {
            let meta = meta.map_err(|e| StorageError::Unavailable(e.to_string()))?;
            match self.store.delete(&meta.location).await {
                Ok(_) | Err(ObjectStoreError::NotFound { .. }) => deleted += 1,
                Err(e) => return Err(StorageError::Unavailable(e.to_string())),
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            scope = %scope,
            deleted = deleted,
            "S3 scope deleted"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn set_test_credentials() {
        std::env::set_var("AWS_ACCESS_KEY_ID", "test-access-key");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "test-secret-key");
    }

    #[tokio::test]
    async fn test_locator_format_for_custom_endpoint() {
        set_test_credentials();
        let store = S3BlobStore::new(
            "gallery-bucket".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000".to_string()),
        )
        .await
        .unwrap();

        let scope = OwnerScope(Uuid::new_v4());
        let blob_id = keys::generate_blob_key(&scope, "image/jpeg");
        let locator = store.generate_locator(&blob_id);
        assert_eq!(
            locator,
            format!("http://localhost:9000/gallery-bucket/{}", blob_id)
        );
    }

    #[tokio::test]
    async fn test_locator_format_for_aws() {
        set_test_credentials();
        let store = S3BlobStore::new(
            "gallery-bucket".to_string(),
            "eu-west-1".to_string(),
            None,
        )
        .await
        .unwrap();

        let locator = store.generate_locator("gallery/owner/blob.jpg");
        assert_eq!(
            locator,
            "https://gallery-bucket.s3.eu-west-1.amazonaws.com/gallery/owner/blob.jpg"
        );
    }
}
