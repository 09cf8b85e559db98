use crate::keys;
use crate::traits::{BlobStore, StorageError, StorageResult, StoredBlob};
use async_trait::async_trait;
use bytes::Bytes;
use galerie_core::models::OwnerScope;
use galerie_core::StorageBackend;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store implementation
#[derive(Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/galerie/media")
    /// * `base_url` - Base URL for serving blobs (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore {
            base_path,
            base_url,
        })
    }

    /// Convert a blob id to a filesystem path with traversal validation.
    fn blob_id_to_path(&self, blob_id: &str) -> StorageResult<PathBuf> {
        if blob_id.contains("..") || blob_id.starts_with('/') {
            return Err(StorageError::InvalidBlobId(
                "Blob id contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(blob_id))
    }

    fn generate_locator(&self, blob_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), blob_id)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
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
        let path = self.blob_id_to_path(&blob_id)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let locator = self.generate_locator(&blob_id);

        tracing::info!(
            path = %path.display(),
            blob_id = %blob_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local blob store upload successful"
        );

        Ok(StoredBlob { locator, blob_id })
    }

    async fn delete(&self, blob_id: &str) -> StorageResult<bool> {
        let path = self.blob_id_to_path(blob_id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(false);
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), blob_id = %blob_id, "Local blob store delete successful");

        Ok(true)
    }

    async fn delete_scope(&self, scope: &OwnerScope) -> StorageResult<()> {
        let prefix = keys::scope_prefix(scope);
        let path = self.blob_id_to_path(&prefix)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_dir_all(&path).await.map_err(|e| {
            StorageError::Unavailable(format!(
                "Failed to delete scope {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(scope = %prefix, "Local blob store scope deleted");

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    async fn test_store(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_and_delete() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;
        let scope = OwnerScope(Uuid::new_v4());

        let blob = store
            .store(&scope, "image/jpeg", Bytes::from_static(b"jpeg bytes"))
            .await
            .unwrap();

        assert!(blob.blob_id.starts_with(&format!("gallery/{}/", scope.id())));
        assert!(blob.locator.contains(&blob.blob_id));

        assert!(store.delete(&blob.blob_id).await.unwrap());
        // Second delete of the same id is idempotent.
        assert!(!store.delete(&blob.blob_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_false() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let deleted = store.delete("gallery/none/missing.jpg").await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;
        let scope = OwnerScope(Uuid::new_v4());

        let result = store.store(&scope, "image/jpeg", Bytes::new()).await;
        assert!(matches!(result, Err(StorageError::PayloadRejected(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        let result = store.delete("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidBlobId(_))));

        let result = store.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidBlobId(_))));
    }

    #[tokio::test]
    async fn test_delete_scope_removes_all_owner_blobs() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;
        let scope = OwnerScope(Uuid::new_v4());
        let other = OwnerScope(Uuid::new_v4());

        let mine = store
            .store(&scope, "image/png", Bytes::from_static(b"one"))
            .await
            .unwrap();
        let theirs = store
            .store(&other, "image/png", Bytes::from_static(b"two"))
            .await
            .unwrap();

        store.delete_scope(&scope).await.unwrap();

        assert!(!store.delete(&mine.blob_id).await.unwrap());
        // The other owner's blob is untouched.
        assert!(store.delete(&theirs.blob_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_scope_of_unknown_owner_is_ok() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir).await;

        store.delete_scope(&OwnerScope(Uuid::new_v4())).await.unwrap();
    }
}
