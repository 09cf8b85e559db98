use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Owner predicate passed to the repository as data.
///
/// Every read, delete, and search is scoped to exactly one owner. The scope
/// is always bound as a query parameter, never interpolated into query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerScope(pub Uuid);

impl OwnerScope {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Display for OwnerScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

/// A committed gallery record.
///
/// Records are created by the ingestion saga, never mutated, and destroyed
/// only by the deletion saga. A record is listable and searchable iff it has
/// been durably committed in the media repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Repository-assigned identifier.
    pub id: Uuid,
    /// Uploading owner; immutable, no transfer operation exists.
    pub owner_id: Uuid,
    /// Public URL returned by the blob store, used for display.
    pub locator: String,
    /// Opaque handle the blob store needs to delete the asset.
    pub blob_id: String,
    /// Fixed-dimension embedding; exactly `Config::embedding_dim` components.
    pub embedding: Vec<f32>,
    /// Set once at insert.
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the media repository. The repository assigns `id` and
/// `created_at` when the insert commits.
#[derive(Debug, Clone)]
pub struct NewMediaRecord {
    pub owner_id: Uuid,
    pub locator: String,
    pub blob_id: String,
    pub embedding: Vec<f32>,
}

impl NewMediaRecord {
    pub fn new(
        owner: &OwnerScope,
        locator: impl Into<String>,
        blob_id: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            owner_id: owner.id(),
            locator: locator.into(),
            blob_id: blob_id.into(),
            embedding,
        }
    }
}
