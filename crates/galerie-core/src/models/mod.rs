//! Domain models shared across the gallery components.

pub mod media;
pub mod search;

pub use media::{MediaRecord, NewMediaRecord, OwnerScope};
pub use search::{
    BatchItemFailure, BatchSummary, CommittedUpload, ListEntry, ListSummary, PurgeReport,
    ScoredRecord, SearchHit, SearchOutcome,
};
