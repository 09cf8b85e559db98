//! Embedding provider abstraction.
//!
//! Turns raw image bytes or caption text into a fixed-length vector. The
//! provider returns exactly the configured dimension or fails; a partial or
//! mismatched vector is never handed to callers.

pub mod clip;

use async_trait::async_trait;
use bytes::Bytes;
use galerie_core::AppError;
use thiserror::Error;

pub use clip::ClipHttpClient;

/// Embedding operation errors
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Network failure or 5xx from the provider.
    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),

    /// The provider rejected the payload (4xx).
    #[error("Invalid embedding input: {0}")]
    InvalidInput(String),

    /// The provider answered with a vector of the wrong dimension.
    #[error("Embedding has {got} components, expected {expected}")]
    BadVector { got: usize, expected: usize },
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidInput(msg) => AppError::Validation(msg),
            other => AppError::Provider(other.to_string()),
        }
    }
}

/// Provider for image and caption embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The fixed dimension every returned vector has.
    fn dim(&self) -> usize;

    /// Embed raw image bytes. Returns exactly [`dim`](Self::dim) components
    /// or fails.
    async fn embed_image(&self, data: Bytes) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a text caption. Returns exactly [`dim`](Self::dim) components
    /// or fails.
    async fn embed_text(&self, caption: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Enforce the dimension invariant on a provider response.
pub(crate) fn check_dim(vec: Vec<f32>, expected: usize) -> Result<Vec<f32>, EmbeddingError> {
    if vec.len() != expected {
        return Err(EmbeddingError::BadVector {
            got: vec.len(),
            expected,
        });
    }
    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dim_accepts_exact() {
        assert_eq!(check_dim(vec![0.0; 512], 512).unwrap().len(), 512);
    }

    #[test]
    fn test_check_dim_rejects_mismatch() {
        let err = check_dim(vec![0.0; 384], 512).unwrap_err();
        match err {
            EmbeddingError::BadVector { got, expected } => {
                assert_eq!(got, 384);
                assert_eq!(expected, 512);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_input_maps_to_validation() {
        let app: AppError = EmbeddingError::InvalidInput("empty caption".to_string()).into();
        assert_eq!(app.error_type(), "Validation");

        let app: AppError = EmbeddingError::Unavailable("timeout".to_string()).into();
        assert_eq!(app.error_type(), "Provider");
    }
}
