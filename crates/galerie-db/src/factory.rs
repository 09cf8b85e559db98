use crate::{IndexedRepository, MediaRepository, ScanRepository};
use galerie_core::{Config, RepositoryBackend};
use sqlx::PgPool;
use std::sync::Arc;

/// Create a media repository variant based on configuration
pub fn create_repository(pool: PgPool, config: &Config) -> Arc<dyn MediaRepository> {
    match config.repository_backend {
        RepositoryBackend::Scan => Arc::new(ScanRepository::new(
            pool,
            config.similarity_metric,
            config.embedding_dim,
        )),
        RepositoryBackend::Indexed => Arc::new(IndexedRepository::new(
            pool,
            config.similarity_metric,
            config.embedding_dim,
        )),
    }
}
