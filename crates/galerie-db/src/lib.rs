//! Galerie DB Library
//!
//! Media repository implementations over Postgres. One contract, two
//! deployment variants: [`ScanRepository`] loads the owner's records and
//! ranks client-side (exact); [`IndexedRepository`] pushes the owner filter
//! and K down to the pgvector index (approximate). The variant is chosen by
//! configuration at startup, never by runtime type inspection.

pub mod factory;
pub mod indexed;
pub mod repository;
pub mod scan;
pub mod transaction;

mod queries;
mod row;

pub use factory::create_repository;
pub use indexed::IndexedRepository;
pub use repository::MediaRepository;
pub use scan::ScanRepository;
pub use transaction::TransactionGuard;
