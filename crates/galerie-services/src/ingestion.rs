//! Ingestion saga.
//!
//! Orchestrates one upload across the blob store, the embedding provider,
//! and the media repository. The blob store offers no transactional hooks,
//! so atomicity across the three systems is approximated with compensation:
//! every failure class has exactly one cleanup path, and a record becomes
//! visible only once the repository insert commits.
//!
//! States: `Start → InFlight → Persisting → Committed`, or
//! `→ Compensating → Failed`.

use std::sync::Arc;

use bytes::Bytes;
use galerie_core::models::{BatchItemFailure, BatchSummary, CommittedUpload, NewMediaRecord, OwnerScope};
use galerie_core::validation::{validate_batch_count, validate_upload};
use galerie_core::{AppError, Config};
use galerie_db::MediaRepository;
use galerie_embedding::EmbeddingProvider;
use galerie_storage::BlobStore;

/// Saga progress, traced on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Start,
    InFlight,
    Persisting,
    Committed,
    Compensating,
    Failed,
}

/// One upload item: raw bytes plus the declared MIME type.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub data: Bytes,
    pub content_type: String,
}

impl UploadItem {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }
}

/// Ingestion saga runner.
///
/// Each call runs an independent saga instance; there is no lock across
/// uploads, even for the same owner. Concurrent uploads may commit in any
/// order.
#[derive(Clone)]
pub struct IngestionSaga {
    store: Arc<dyn BlobStore>,
    provider: Arc<dyn EmbeddingProvider>,
    repository: Arc<dyn MediaRepository>,
    config: Arc<Config>,
}

impl IngestionSaga {
    pub fn new(
        store: Arc<dyn BlobStore>,
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn MediaRepository>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            provider,
            repository,
            config,
        }
    }

    /// Ingest a single image.
    ///
    /// The saga future is spawned onto the runtime, so a caller that
    /// disconnects mid-saga does not abandon a partially-applied external
    /// side effect; compensation always runs to completion.
    pub async fn ingest(
        &self,
        owner: OwnerScope,
        item: UploadItem,
    ) -> Result<CommittedUpload, AppError> {
        validate_upload(&item.data, &item.content_type, &self.config)?;

        let saga = self.clone();
        tokio::spawn(async move { saga.run(owner, item).await })
            .await
            .map_err(|e| AppError::Internal(format!("Ingestion saga aborted: {}", e)))?
    }

    /// Ingest a batch of up to `MAX_BATCH_ITEMS` images.
    ///
    /// Consistency model: per-item atomicity, not whole-batch atomicity.
    /// Each item runs its own saga instance; a failure on item k compensates
    /// only item k's blob, and items committed before k remain committed.
    /// The item count is validated before any network call.
    pub async fn ingest_batch(
        &self,
        owner: OwnerScope,
        items: Vec<UploadItem>,
    ) -> Result<BatchSummary, AppError> {
        validate_batch_count(items.len(), self.config.max_batch_items)?;

        let saga = self.clone();
        tokio::spawn(async move {
            let mut summary = BatchSummary::default();
            for (index, item) in items.into_iter().enumerate() {
                match saga.run_validated(owner, item).await {
                    Ok(committed) => summary.uploaded.push(committed),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            owner_id = %owner,
                            item_index = index,
                            "Batch item failed"
                        );
                        summary.failed.push(BatchItemFailure {
                            index,
                            error: e.client_message(),
                        });
                    }
                }
            }
            summary
        })
        .await
        .map_err(|e| AppError::Internal(format!("Batch ingestion aborted: {}", e)))
    }

    /// Validate one batch item, then run its saga. Item-level validation
    /// failures fail that item only.
    async fn run_validated(
        &self,
        owner: OwnerScope,
        item: UploadItem,
    ) -> Result<CommittedUpload, AppError> {
        validate_upload(&item.data, &item.content_type, &self.config)?;
        self.run(owner, item).await
    }

    #[tracing::instrument(skip(self, item), fields(owner_id = %owner, payload_bytes = item.data.len()))]
    async fn run(&self, owner: OwnerScope, item: UploadItem) -> Result<CommittedUpload, AppError> {
        let mut state = SagaState::Start;
        self.transition(&mut state, SagaState::InFlight);

        // Fan-out: blob upload and embedding run concurrently; the saga
        // suspends until both resolve.
        let (blob_result, embed_result) = tokio::join!(
            self.store.store(&owner, &item.content_type, item.data.clone()),
            self.provider.embed_image(item.data.clone()),
        );

        let (blob, embedding) = match (blob_result, embed_result) {
            (Ok(blob), Ok(embedding)) => (blob, embedding),
            (Ok(blob), Err(embed_err)) => {
                self.transition(&mut state, SagaState::Compensating);
                self.compensate_blob(&blob.blob_id).await;
                self.transition(&mut state, SagaState::Failed);
                return Err(embed_err.into());
            }
            (Err(store_err), embed_result) => {
                // The blob was never stored; nothing to compensate on either
                // side, regardless of how the embedding call ended.
                if let Err(embed_err) = embed_result {
                    tracing::debug!(error = %embed_err, "Embedding also failed");
                }
                self.transition(&mut state, SagaState::Failed);
                return Err(store_err.into());
            }
        };

        self.transition(&mut state, SagaState::Persisting);

        let record = NewMediaRecord::new(&owner, blob.locator, blob.blob_id.clone(), embedding);
        match self.repository.insert(record).await {
            Ok(committed) => {
                self.transition(&mut state, SagaState::Committed);
                Ok(CommittedUpload {
                    id: committed.id,
                    locator: committed.locator,
                })
            }
            Err(insert_err) => {
                self.transition(&mut state, SagaState::Compensating);
                self.compensate_blob(&blob.blob_id).await;
                self.transition(&mut state, SagaState::Failed);
                Err(insert_err)
            }
        }
    }

    fn transition(&self, state: &mut SagaState, next: SagaState) {
        tracing::debug!(from = ?state, to = ?next, "Ingestion saga transition");
        *state = next;
    }

    /// Compensate a stored blob after a later step failed. Best-effort: a
    /// single attempt, failures logged as warnings without escalating past
    /// the original error.
    async fn compensate_blob(&self, blob_id: &str) {
        match self.store.delete(blob_id).await {
            Ok(true) => {
                tracing::debug!(blob_id = %blob_id, "Compensated stored blob");
            }
            Ok(false) => {
                tracing::debug!(blob_id = %blob_id, "Blob already absent during compensation");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    blob_id = %blob_id,
                    "Blob cleanup failed during compensation; leaving orphan"
                );
            }
        }
    }
}
