//! Blob store abstraction trait.

use async_trait::async_trait;
use bytes::Bytes;
use galerie_core::models::OwnerScope;
use galerie_core::{AppError, StorageBackend};
use thiserror::Error;

/// Blob store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend/network failure while storing or deleting.
    #[error("Blob store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the payload itself.
    #[error("Payload rejected: {0}")]
    PayloadRejected(String),

    #[error("Invalid blob id: {0}")]
    InvalidBlobId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for blob store operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PayloadRejected(msg) => AppError::Validation(msg),
            other => AppError::Provider(other.to_string()),
        }
    }
}

/// Result of a successful `store` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Publicly accessible URL for the asset, used for display.
    pub locator: String,
    /// Opaque handle needed to delete the asset later.
    pub blob_id: String,
}

/// Blob store abstraction trait
///
/// All backends (S3, local filesystem) implement this trait so the rest of
/// the gallery never couples to a specific provider. The backend is chosen
/// once at deployment configuration, never via runtime type inspection.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an asset under the owner's scope and return its locator plus
    /// deletable identifier.
    async fn store(
        &self,
        scope: &OwnerScope,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredBlob>;

    /// Delete an asset. Idempotent: deleting a non-existent id returns
    /// `Ok(false)`, not an error.
    async fn delete(&self, blob_id: &str) -> StorageResult<bool>;

    /// Bulk cleanup of an owner's entire scope (account purge).
    async fn delete_scope(&self, scope: &OwnerScope) -> StorageResult<()>;

    /// Get the blob store backend type
    fn backend_type(&self) -> StorageBackend;
}
