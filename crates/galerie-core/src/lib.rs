//! Galerie Core Library
//!
//! This crate provides the domain models, error types, configuration,
//! validation, and similarity math shared across all Galerie components.

pub mod config;
pub mod error;
pub mod models;
pub mod similarity;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, RepositoryBackend, StorageBackend};
pub use error::AppError;
pub use models::{
    BatchItemFailure, BatchSummary, CommittedUpload, ListEntry, ListSummary, MediaRecord,
    NewMediaRecord, OwnerScope, PurgeReport, ScoredRecord, SearchHit, SearchOutcome,
};
pub use similarity::Metric;
