//! Galerie Storage Library
//!
//! Blob store abstraction and implementations. The gallery treats the blob
//! store as a consumed capability: `store` returns a stable locator plus a
//! deletable identifier, `delete` is idempotent, and `delete_scope` removes
//! an owner's entire folder during account purges.
//!
//! # Key format
//!
//! Blob keys are owner-scoped: `gallery/{owner_id}/{uuid}.{ext}`. Keys must
//! not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use galerie_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult, StoredBlob};
