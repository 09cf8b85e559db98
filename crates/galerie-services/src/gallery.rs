//! Gallery facade.
//!
//! Process-wide resource holder with explicit initialization and shutdown:
//! the connection pool, blob store, embedding provider, and repository are
//! built once by [`Gallery::connect`] and closed by [`Gallery::shutdown`].
//! No implicit global singletons.

use std::sync::Arc;

use bytes::Bytes;
use galerie_core::models::{
    BatchSummary, CommittedUpload, ListEntry, ListSummary, OwnerScope, PurgeReport, SearchOutcome,
};
use galerie_core::{AppError, Config};
use galerie_db::{create_repository, MediaRepository};
use galerie_embedding::{ClipHttpClient, EmbeddingProvider};
use galerie_storage::{create_blob_store, BlobStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::deletion::DeletionSaga;
use crate::ingestion::{IngestionSaga, UploadItem};
use crate::search::SearchEngine;

/// The gallery service surface. Owner identity is assumed to be resolved by
/// an external auth collaborator before any call lands here.
pub struct Gallery {
    pool: Option<PgPool>,
    config: Arc<Config>,
    ingestion: IngestionSaga,
    deletion: DeletionSaga,
    search: SearchEngine,
    repository: Arc<dyn MediaRepository>,
}

impl Gallery {
    /// Initialize all process-wide resources from configuration: connect
    /// the pool, run migrations, and build the deployment-selected blob
    /// store, embedding provider, and repository variant.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

        let store = create_blob_store(&config).await?;
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(ClipHttpClient::new(
            &config.embedding_service_url,
            config.embedding_dim,
        )?);
        let repository = create_repository(pool.clone(), &config);

        tracing::info!(
            storage_backend = %config.storage_backend,
            repository_backend = %config.repository_backend,
            metric = %config.similarity_metric,
            embedding_dim = config.embedding_dim,
            "Gallery initialized"
        );

        Ok(Self::assemble(Some(pool), config, store, provider, repository))
    }

    /// Wire a gallery from pre-built collaborators. Used by tests and by
    /// deployments that manage their own pool.
    pub fn from_components(
        config: Config,
        store: Arc<dyn BlobStore>,
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn MediaRepository>,
    ) -> Self {
        Self::assemble(None, config, store, provider, repository)
    }

    fn assemble(
        pool: Option<PgPool>,
        config: Config,
        store: Arc<dyn BlobStore>,
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn MediaRepository>,
    ) -> Self {
        let config = Arc::new(config);
        let ingestion = IngestionSaga::new(
            store.clone(),
            provider.clone(),
            repository.clone(),
            config.clone(),
        );
        let deletion = DeletionSaga::new(store, repository.clone());
        let search = SearchEngine::new(provider, repository.clone(), config.search_top_k);

        Self {
            pool,
            config,
            ingestion,
            deletion,
            search,
            repository,
        }
    }

    /// Upload a single image and return its record id and locator.
    pub async fn upload(
        &self,
        owner: OwnerScope,
        data: Bytes,
        content_type: &str,
    ) -> Result<CommittedUpload, AppError> {
        self.ingestion
            .ingest(owner, UploadItem::new(data, content_type))
            .await
    }

    /// Upload a batch of images; per-item atomicity, itemized summary.
    pub async fn upload_batch(
        &self,
        owner: OwnerScope,
        items: Vec<UploadItem>,
    ) -> Result<BatchSummary, AppError> {
        self.ingestion.ingest_batch(owner, items).await
    }

    /// List the owner's gallery.
    pub async fn list(&self, owner: OwnerScope) -> Result<ListSummary, AppError> {
        let records = self.repository.list_by_owner(&owner).await?;
        let items: Vec<ListEntry> = records
            .into_iter()
            .map(|r| ListEntry {
                id: r.id,
                locator: r.locator,
            })
            .collect();
        Ok(ListSummary {
            count: items.len(),
            items,
        })
    }

    /// Delete one record; the owner must match.
    pub async fn delete(&self, owner: OwnerScope, id: Uuid) -> Result<(), AppError> {
        self.deletion.delete_record(owner, id).await
    }

    /// Search the owner's gallery by caption, returning at most the
    /// deployment-fixed top K.
    pub async fn search(
        &self,
        owner: OwnerScope,
        caption: &str,
    ) -> Result<SearchOutcome, AppError> {
        self.search.search(owner, caption).await
    }

    /// Cascade-delete all of the owner's records and blobs.
    pub async fn purge_owner(&self, owner: OwnerScope) -> Result<PurgeReport, AppError> {
        self.deletion.purge_owner(owner).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release process-wide resources.
    pub async fn shutdown(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        tracing::info!("Gallery shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::mocks::{
        test_config, MockBlobStore, MockEmbeddingProvider, MockMediaRepository,
    };

    fn gallery() -> (Gallery, MockBlobStore, MockMediaRepository) {
        let store = MockBlobStore::new();
        let provider = MockEmbeddingProvider::new(8);
        let repository = MockMediaRepository::new(8);
        let gallery = Gallery::from_components(
            test_config(),
            Arc::new(store.clone()),
            Arc::new(provider.clone()),
            Arc::new(repository.clone()),
        );
        (gallery, store, repository)
    }

    #[tokio::test]
    async fn test_upload_then_list_then_delete() {
        let (gallery, store, _) = gallery();
        let owner = OwnerScope(Uuid::new_v4());

        let committed = gallery
            .upload(owner, Bytes::from(vec![1u8; 128]), "image/jpeg")
            .await
            .unwrap();

        let listing = gallery.list(owner).await.unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.items[0].id, committed.id);
        assert_eq!(listing.items[0].locator, committed.locator);

        gallery.delete(owner, committed.id).await.unwrap();

        let listing = gallery.list(owner).await.unwrap();
        assert_eq!(listing.count, 0);
        assert!(listing.items.is_empty());
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_deleted_record_disappears_from_search() {
        let (gallery, _, _) = gallery();
        let owner = OwnerScope(Uuid::new_v4());

        let committed = gallery
            .upload(owner, Bytes::from(vec![1u8; 128]), "image/jpeg")
            .await
            .unwrap();

        match gallery.search(owner, "anything").await.unwrap() {
            SearchOutcome::Ranked(hits) => assert_eq!(hits[0].id, committed.id),
            other => panic!("unexpected outcome: {other:?}"),
        }

        gallery.delete(owner, committed.id).await.unwrap();

        assert_eq!(
            gallery.search(owner, "anything").await.unwrap(),
            SearchOutcome::NoCandidates
        );
    }

    #[tokio::test]
    async fn test_purge_clears_owner_gallery() {
        let (gallery, store, _) = gallery();
        let owner = OwnerScope(Uuid::new_v4());

        for _ in 0..3 {
            gallery
                .upload(owner, Bytes::from(vec![2u8; 64]), "image/png")
                .await
                .unwrap();
        }

        let report = gallery.purge_owner(owner).await.unwrap();
        assert_eq!(report.records_deleted, 3);
        assert_eq!(gallery.list(owner).await.unwrap().count, 0);
        assert_eq!(store.blob_count(), 0);
    }
}
