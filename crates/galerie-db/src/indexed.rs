//! Indexed repository variant.
//!
//! Pushes the owner filter and K down to the pgvector IVFFlat index, which
//! returns the top-K by its internal metric directly. Ranking precision may
//! be approximate (ANN) — a deliberate throughput/accuracy trade-off.

use async_trait::async_trait;
use galerie_core::models::{MediaRecord, NewMediaRecord, OwnerScope, ScoredRecord};
use galerie_core::similarity::Metric;
use galerie_core::validation::validate_embedding_dim;
use galerie_core::AppError;
use pgvector::Vector;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::queries;
use crate::repository::MediaRepository;
use crate::row::MediaRow;

#[derive(Clone)]
pub struct IndexedRepository {
    pool: PgPool,
    metric: Metric,
    expected_dim: usize,
}

impl IndexedRepository {
    pub fn new(pool: PgPool, metric: Metric, expected_dim: usize) -> Self {
        Self {
            pool,
            metric,
            expected_dim,
        }
    }

    /// Statement for the configured metric. `<=>` is cosine distance
    /// (similarity = 1 - distance); `<#>` is negative inner product
    /// (similarity = -distance). Both order ascending by distance, which is
    /// descending by similarity.
    fn search_sql(&self) -> &'static str {
        match self.metric {
            Metric::Cosine => {
                r#"
                SELECT id, owner_id, locator, blob_id, embedding, created_at,
                       1 - (embedding <=> $2) AS similarity
                FROM media
                WHERE owner_id = $1
                ORDER BY embedding <=> $2
                LIMIT $3
                "#
            }
            Metric::Dot => {
                r#"
                SELECT id, owner_id, locator, blob_id, embedding, created_at,
                       -(embedding <#> $2) AS similarity
                FROM media
                WHERE owner_id = $1
                ORDER BY embedding <#> $2
                LIMIT $3
                "#
            }
        }
    }
}

#[async_trait]
impl MediaRepository for IndexedRepository {
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

    #[tracing::instrument(skip(self, query), fields(db.table = "media", db.operation = "vector_search", owner_id = %owner, k = k))]
    async fn search_top_k(
        &self,
        owner: &OwnerScope,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, AppError> {
        validate_embedding_dim(query, self.expected_dim)?;

        let vector = Vector::from(query.to_vec());

        let rows = sqlx::query(self.search_sql())
            .bind(owner.id())
            .bind(vector)
            .bind(k as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            let similarity = row.try_get::<f64, _>("similarity")? as f32;
            let media = MediaRow {
                id: row.try_get("id")?,
                owner_id: row.try_get("owner_id")?,
                locator: row.try_get("locator")?,
                blob_id: row.try_get("blob_id")?,
                embedding: row.try_get("embedding")?,
                created_at: row.try_get("created_at")?,
            };
            scored.push(ScoredRecord {
                record: MediaRecord::from(media),
                similarity,
            });
        }

        Ok(scored)
    }
}
