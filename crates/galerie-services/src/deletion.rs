//! Deletion saga.
//!
//! Removes one record or all records of an owner across the media repository
//! and the blob store. The metadata delete commits first and is the
//! durability boundary; blob deletion afterwards is best-effort — a failure
//! leaves an orphan, is logged as a warning, and is never retried or
//! surfaced to the caller.

use std::sync::Arc;

use galerie_core::models::{OwnerScope, PurgeReport};
use galerie_core::AppError;
use galerie_db::MediaRepository;
use galerie_storage::BlobStore;
use uuid::Uuid;

#[derive(Clone)]
pub struct DeletionSaga {
    store: Arc<dyn BlobStore>,
    repository: Arc<dyn MediaRepository>,
}

impl DeletionSaga {
    pub fn new(store: Arc<dyn BlobStore>, repository: Arc<dyn MediaRepository>) -> Self {
        Self { store, repository }
    }

    /// Delete a single record.
    ///
    /// Fails `NotFound` when no such record exists and `Forbidden` when it
    /// belongs to another owner. The authorization decision is made here,
    /// from a record this layer is permitted to read; the repository itself
    /// only ever reports `NotFound` so existence cannot leak through it.
    pub async fn delete_record(&self, owner: OwnerScope, id: Uuid) -> Result<(), AppError> {
        let saga = self.clone();
        tokio::spawn(async move { saga.run_delete(owner, id).await })
            .await
            .map_err(|e| AppError::Internal(format!("Deletion saga aborted: {}", e)))?
    }

    #[tracing::instrument(skip(self), fields(owner_id = %owner, record_id = %id))]
    async fn run_delete(&self, owner: OwnerScope, id: Uuid) -> Result<(), AppError> {
        let record = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if record.owner_id != owner.id() {
            return Err(AppError::Forbidden(
                "Not authorized to delete this image".to_string(),
            ));
        }

        // Durability boundary: once this commits, the record is gone from
        // all future reads.
        self.repository.delete_by_id(id, &owner).await?;

        match self.store.delete(&record.blob_id).await {
            Ok(true) => {
                tracing::debug!(blob_id = %record.blob_id, "Blob deleted");
            }
            Ok(false) => {
                tracing::debug!(blob_id = %record.blob_id, "Blob already absent");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    blob_id = %record.blob_id,
                    "Blob deletion failed after metadata commit; leaving orphan"
                );
            }
        }

        Ok(())
    }

    /// Cascade-delete every record and blob of an owner (account purge).
    ///
    /// Metadata rows are removed first under a transaction; the blob and
    /// scope cleanup that follows is best-effort and never blocks the
    /// already-committed metadata deletion.
    pub async fn purge_owner(&self, owner: OwnerScope) -> Result<PurgeReport, AppError> {
        let saga = self.clone();
        tokio::spawn(async move { saga.run_purge(owner).await })
            .await
            .map_err(|e| AppError::Internal(format!("Purge saga aborted: {}", e)))?
    }

    #[tracing::instrument(skip(self), fields(owner_id = %owner))]
    async fn run_purge(&self, owner: OwnerScope) -> Result<PurgeReport, AppError> {
        let records = self.repository.list_by_owner(&owner).await?;
        let records_deleted = self.repository.delete_by_owner(&owner).await?;

        let mut report = PurgeReport {
            records_deleted,
            ..PurgeReport::default()
        };

        for record in &records {
            match self.store.delete(&record.blob_id).await {
                Ok(_) => report.blobs_deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        blob_id = %record.blob_id,
                        "Blob deletion failed during purge"
                    );
                    report.blob_failures += 1;
                }
            }
        }

        if let Err(e) = self.store.delete_scope(&owner).await {
            tracing::warn!(error = %e, owner_id = %owner, "Scope cleanup failed during purge");
        }

        tracing::info!(
            owner_id = %owner,
            records_deleted = report.records_deleted,
            blobs_deleted = report.blobs_deleted,
            blob_failures = report.blob_failures,
            "Owner purge completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{IngestionSaga, UploadItem};
    use crate::test_helpers::mocks::{
        test_config, MockBlobStore, MockEmbeddingProvider, MockMediaRepository,
    };

    struct Fixture {
        store: MockBlobStore,
        provider: MockEmbeddingProvider,
        repository: MockMediaRepository,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MockBlobStore::new(),
                provider: MockEmbeddingProvider::new(8),
                repository: MockMediaRepository::new(8),
            }
        }

        fn deletion(&self) -> DeletionSaga {
            DeletionSaga::new(
                Arc::new(self.store.clone()),
                Arc::new(self.repository.clone()),
            )
        }

        async fn seed(&self, owner: OwnerScope, n: usize) -> Vec<Uuid> {
            let ingestion = IngestionSaga::new(
                Arc::new(self.store.clone()),
                Arc::new(self.provider.clone()),
                Arc::new(self.repository.clone()),
                Arc::new(test_config()),
            );
            let mut ids = Vec::new();
            for _ in 0..n {
                let committed = ingestion
                    .ingest(owner, UploadItem::new(vec![7u8; 32], "image/jpeg"))
                    .await
                    .unwrap();
                ids.push(committed.id);
            }
            ids
        }
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_blob() {
        let fx = Fixture::new();
        let owner = OwnerScope(Uuid::new_v4());
        let ids = fx.seed(owner, 2).await;

        fx.deletion().delete_record(owner, ids[0]).await.unwrap();

        let remaining = fx.repository.records_for(&owner);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
        assert_eq!(fx.store.blob_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let fx = Fixture::new();
        let owner = OwnerScope(Uuid::new_v4());

        let err = fx
            .deletion()
            .delete_record(owner, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), "NotFound");
    }

    #[tokio::test]
    async fn test_foreign_owner_delete_is_forbidden_and_keeps_record() {
        let fx = Fixture::new();
        let owner_b = OwnerScope(Uuid::new_v4());
        let ids = fx.seed(owner_b, 1).await;

        let owner_a = OwnerScope(Uuid::new_v4());
        let err = fx
            .deletion()
            .delete_record(owner_a, ids[0])
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "Forbidden");
        assert_eq!(fx.repository.records_for(&owner_b).len(), 1);
        assert_eq!(fx.store.blob_count(), 1);
    }

    #[tokio::test]
    async fn test_blob_failure_after_metadata_commit_is_swallowed() {
        let fx = Fixture::new();
        let owner = OwnerScope(Uuid::new_v4());
        let ids = fx.seed(owner, 1).await;

        fx.store.fail_deletes();
        // Metadata commit wins; the orphaned blob is a warning only.
        fx.deletion().delete_record(owner, ids[0]).await.unwrap();
        assert!(fx.repository.records_for(&owner).is_empty());
    }

    #[tokio::test]
    async fn test_purge_removes_all_records_and_blobs() {
        let fx = Fixture::new();
        let owner = OwnerScope(Uuid::new_v4());
        let other = OwnerScope(Uuid::new_v4());
        fx.seed(owner, 3).await;
        fx.seed(other, 1).await;

        let report = fx.deletion().purge_owner(owner).await.unwrap();

        assert_eq!(report.records_deleted, 3);
        assert_eq!(report.blobs_deleted, 3);
        assert_eq!(report.blob_failures, 0);
        assert!(fx.repository.records_for(&owner).is_empty());
        // The other owner is untouched.
        assert_eq!(fx.repository.records_for(&other).len(), 1);
        assert_eq!(fx.store.blob_count(), 1);
    }

    #[tokio::test]
    async fn test_purge_reports_blob_failures_without_failing() {
        let fx = Fixture::new();
        let owner = OwnerScope(Uuid::new_v4());
        fx.seed(owner, 2).await;

        fx.store.fail_deletes();
        let report = fx.deletion().purge_owner(owner).await.unwrap();

        assert_eq!(report.records_deleted, 2);
        assert_eq!(report.blobs_deleted, 0);
        assert_eq!(report.blob_failures, 2);
        assert!(fx.repository.records_for(&owner).is_empty());
    }
}
