//! Row mapping for the `media` table.

use chrono::{DateTime, Utc};
use galerie_core::models::MediaRecord;
use pgvector::Vector;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct MediaRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub locator: String,
    pub blob_id: String,
    pub embedding: Vector,
    pub created_at: DateTime<Utc>,
}

impl From<MediaRow> for MediaRecord {
    fn from(row: MediaRow) -> Self {
        MediaRecord {
            id: row.id,
            owner_id: row.owner_id,
            locator: row.locator,
            blob_id: row.blob_id,
            embedding: row.embedding.to_vec(),
            created_at: row.created_at,
        }
    }
}
