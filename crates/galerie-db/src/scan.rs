//! Scan repository variant.
//!
//! Linear store: similarity is computed client-side over the owner's full
//! record set, so ranking is exact and the stable tie-break is guaranteed.

use async_trait::async_trait;
use galerie_core::models::{MediaRecord, NewMediaRecord, OwnerScope, ScoredRecord};
use galerie_core::similarity::{self, Metric};
use galerie_core::validation::validate_embedding_dim;
use galerie_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::queries;
use crate::repository::MediaRepository;

#[derive(Clone)]
pub struct ScanRepository {
    pool: PgPool,
    metric: Metric,
    expected_dim: usize,
}

impl ScanRepository {
    pub fn new(pool: PgPool, metric: Metric, expected_dim: usize) -> Self {
        Self {
            pool,
            metric,
            expected_dim,
        }
    }
}

#[async_trait]
impl MediaRepository for ScanRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "media", db.operation = "insert", owner_id = %record.owner_id))]
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, AppError> {
        queries::insert_record(&self.pool, record, self.expected_dim).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", owner_id = %owner))]
    async fn list_by_owner(&self, owner: &OwnerScope) -> Result<Vec<MediaRecord>, AppError> {
        queries::list_by_owner(&self.pool, owner).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        queries::get_by_id(&self.pool, id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id, owner_id = %owner))]
    async fn delete_by_id(&self, id: Uuid, owner: &OwnerScope) -> Result<(), AppError> {
        queries::delete_by_id(&self.pool, id, owner).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", owner_id = %owner))]
    async fn delete_by_owner(&self, owner: &OwnerScope) -> Result<u64, AppError> {
        queries::delete_by_owner(&self.pool, owner).await
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "media", db.operation = "scan_search", owner_id = %owner, k = k))]
    async fn search_top_k(
        &self,
        owner: &OwnerScope,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, AppError> {
        validate_embedding_dim(query, self.expected_dim)?;

        let records = queries::list_by_owner(&self.pool, owner).await?;

        let ranked = similarity::rank_top_k(
            self.metric,
            query,
            records.iter().map(|r| r.embedding.as_slice()),
            k,
        );

        Ok(ranked
            .into_iter()
            .map(|(idx, score)| ScoredRecord {
                record: records[idx].clone(),
                similarity: score,
            })
            .collect())
    }
}
