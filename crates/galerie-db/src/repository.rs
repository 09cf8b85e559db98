//! Media repository contract.

use async_trait::async_trait;
use galerie_core::models::{MediaRecord, NewMediaRecord, OwnerScope, ScoredRecord};
use galerie_core::AppError;
use uuid::Uuid;

/// Persistence and query contract for gallery records, polymorphic over the
/// scan and indexed variants.
///
/// Contract shared by both variants:
/// - `insert` either fully succeeds (record durably visible to subsequent
///   reads) or fully fails with no partial record.
/// - `delete_by_id` succeeds only if the record exists AND belongs to the
///   owner; in both other cases it reports `NotFound`. The repository never
///   distinguishes "missing" from "someone else's" — existence must not leak
///   across this boundary. The deletion saga, which is permitted to read the
///   record, owns the authorization decision.
/// - `search_top_k` returns at most `k` candidates scored by the deployment
///   metric, scoped to the owner; candidate order is the ranking order.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, AppError>;

    async fn list_by_owner(&self, owner: &OwnerScope) -> Result<Vec<MediaRecord>, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError>;

    async fn delete_by_id(&self, id: Uuid, owner: &OwnerScope) -> Result<(), AppError>;

    /// Delete all of an owner's records, returning how many were removed.
    async fn delete_by_owner(&self, owner: &OwnerScope) -> Result<u64, AppError>;

    async fn search_top_k(
        &self,
        owner: &OwnerScope,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredRecord>, AppError>;
}
