//! Galerie Services Library
//!
//! The coordination layer: the ingestion and deletion sagas, the similarity
//! search engine, and the [`Gallery`] facade that wires process-wide
//! resources together with explicit initialization and shutdown.

pub mod deletion;
pub mod gallery;
pub mod ingestion;
pub mod search;
pub mod test_helpers;

pub use deletion::DeletionSaga;
pub use gallery::Gallery;
pub use ingestion::{IngestionSaga, UploadItem};
pub use search::SearchEngine;
