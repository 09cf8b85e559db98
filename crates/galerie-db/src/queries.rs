//! Shared CRUD queries over the `media` table.
//!
//! Both repository variants persist records identically; only `search_top_k`
//! differs. Owner scoping is always a bound parameter, never interpolated
//! into query text.

use chrono::Utc;
use galerie_core::models::{MediaRecord, NewMediaRecord, OwnerScope};
use galerie_core::validation::validate_embedding_dim;
use galerie_core::AppError;
use pgvector::Vector;
use sqlx::PgPool;
use uuid::Uuid;

use crate::row::MediaRow;
use crate::transaction::TransactionGuard;

pub(crate) async fn insert_record(
    pool: &PgPool,
    record: NewMediaRecord,
    expected_dim: usize,
) -> Result<MediaRecord, AppError> {
    validate_embedding_dim(&record.embedding, expected_dim)?;

    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let vector = Vector::from(record.embedding.clone());

    let mut tx = TransactionGuard::begin(pool).await?;

    sqlx::query(
        r#"
        INSERT INTO media (id, owner_id, locator, blob_id, embedding, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(record.owner_id)
    .bind(&record.locator)
    .bind(&record.blob_id)
    .bind(vector)
    .bind(created_at)
    .execute(&mut **tx)
    .await?;

    tx.commit().await?;

    Ok(MediaRecord {
        id,
        owner_id: record.owner_id,
        locator: record.locator,
        blob_id: record.blob_id,
        embedding: record.embedding,
        created_at,
    })
}

pub(crate) async fn list_by_owner(
    pool: &PgPool,
    owner: &OwnerScope,
) -> Result<Vec<MediaRecord>, AppError> {
    let rows = sqlx::query_as::<_, MediaRow>(
        r#"
        SELECT id, owner_id, locator, blob_id, embedding, created_at
        FROM media
        WHERE owner_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(owner.id())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MediaRecord::from).collect())
}

pub(crate) async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
    let row = sqlx::query_as::<_, MediaRow>(
        r#"
        SELECT id, owner_id, locator, blob_id, embedding, created_at
        FROM media
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(MediaRecord::from))
}

pub(crate) async fn delete_by_id(
    pool: &PgPool,
    id: Uuid,
    owner: &OwnerScope,
) -> Result<(), AppError> {
    let mut tx = TransactionGuard::begin(pool).await?;

    let result = sqlx::query("DELETE FROM media WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner.id())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        // Missing record and foreign owner are deliberately indistinguishable
        // here; the saga layer resolves which one it was.
        return Err(AppError::NotFound("Image not found".to_string()));
    }

    tx.commit().await?;
    Ok(())
}

pub(crate) async fn delete_by_owner(pool: &PgPool, owner: &OwnerScope) -> Result<u64, AppError> {
    let mut tx = TransactionGuard::begin(pool).await?;

    let result = sqlx::query("DELETE FROM media WHERE owner_id = $1")
        .bind(owner.id())
        .execute(&mut **tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}
