//! Similarity search engine.
//!
//! Encodes a caption into the query vector, asks the repository for the
//! owner's top-K candidates, and shapes the outcome. The candidate set is
//! always scoped to the requesting owner; cross-owner search is never
//! possible because the repository takes the owner scope as data on every
//! query.

use std::sync::Arc;

use galerie_core::models::{OwnerScope, SearchHit, SearchOutcome};
use galerie_core::AppError;
use galerie_db::MediaRepository;
use galerie_embedding::EmbeddingProvider;

#[derive(Clone)]
pub struct SearchEngine {
    provider: Arc<dyn EmbeddingProvider>,
    repository: Arc<dyn MediaRepository>,
    default_k: usize,
}

impl SearchEngine {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn MediaRepository>,
        default_k: usize,
    ) -> Self {
        Self {
            provider,
            repository,
            default_k,
        }
    }

    /// Search the owner's gallery by caption.
    ///
    /// Returns [`SearchOutcome::NoCandidates`] when the owner has no stored
    /// images — distinguishable from a ranked list, so the caller decides
    /// whether that is an error or an empty success. Similarity is rounded
    /// to 4 decimal digits on the returned hits; ranking happened at full
    /// precision.
    #[tracing::instrument(skip(self, caption), fields(owner_id = %owner, caption_len = caption.len()))]
    pub async fn search(&self, owner: OwnerScope, caption: &str) -> Result<SearchOutcome, AppError> {
        self.search_with_k(owner, caption, self.default_k).await
    }

    pub async fn search_with_k(
        &self,
        owner: OwnerScope,
        caption: &str,
        k: usize,
    ) -> Result<SearchOutcome, AppError> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Err(AppError::Validation("Caption is required".to_string()));
        }

        let query = self.provider.embed_text(caption).await?;

        let scored = self.repository.search_top_k(&owner, &query, k).await?;
        if scored.is_empty() {
            // Both variants return an empty candidate list only when the
            // owner has zero committed records.
            return Ok(SearchOutcome::NoCandidates);
        }

        Ok(SearchOutcome::Ranked(
            scored.iter().map(SearchHit::from).collect(),
        ))
    }
}
