//! Upload validation.
//!
//! All checks are local and run before any network call, so a validation
//! failure aborts with no side effects to undo.

use crate::config::Config;
use crate::error::AppError;

/// Validate a single upload payload against the deployment limits.
pub fn validate_upload(data: &[u8], content_type: &str, config: &Config) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("Please upload a file".to_string()));
    }
    validate_file_size(data.len(), config.max_file_size_bytes)?;
    validate_content_type(content_type, &config.allowed_content_types)?;
    Ok(())
}

pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), AppError> {
    if size > max_size {
        return Err(AppError::Validation(format!(
            "File size {} bytes exceeds the maximum of {} bytes",
            size, max_size
        )));
    }
    Ok(())
}

pub fn validate_content_type(content_type: &str, allowed: &[String]) -> Result<(), AppError> {
    let normalized = content_type.to_lowercase();
    if !allowed.iter().any(|a| a == &normalized) {
        return Err(AppError::Validation(format!(
            "Content type '{}' is not allowed; only JPEG, PNG, and WEBP images are accepted",
            content_type
        )));
    }
    Ok(())
}

/// Validate a batch's item count. Checked once up front, before any item is
/// uploaded or embedded.
pub fn validate_batch_count(count: usize, max_items: usize) -> Result<(), AppError> {
    if count == 0 {
        return Err(AppError::Validation(
            "Please upload at least one file".to_string(),
        ));
    }
    if count > max_items {
        return Err(AppError::Validation(format!(
            "A maximum of {} images can be uploaded at once",
            max_items
        )));
    }
    Ok(())
}

/// Validate the embedding dimension invariant. Mismatches are rejected,
/// never truncated or padded.
pub fn validate_embedding_dim(embedding: &[f32], expected: usize) -> Result<(), AppError> {
    if embedding.len() != expected {
        return Err(AppError::Validation(format!(
            "Embedding has {} components, expected {}",
            embedding.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit() {
        assert!(validate_file_size(5 * 1024 * 1024, 5 * 1024 * 1024).is_ok());
        assert!(validate_file_size(5 * 1024 * 1024 + 1, 5 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_content_type_allowed() {
        let allowed = vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/webp".to_string(),
        ];
        assert!(validate_content_type("image/jpeg", &allowed).is_ok());
        assert!(validate_content_type("IMAGE/PNG", &allowed).is_ok());
        assert!(validate_content_type("image/gif", &allowed).is_err());
        assert!(validate_content_type("application/pdf", &allowed).is_err());
    }

    #[test]
    fn test_batch_count() {
        assert!(validate_batch_count(1, 50).is_ok());
        assert!(validate_batch_count(50, 50).is_ok());
        assert!(validate_batch_count(51, 50).is_err());
        assert!(validate_batch_count(0, 50).is_err());
    }

    #[test]
    fn test_embedding_dim() {
        assert!(validate_embedding_dim(&[0.0; 512], 512).is_ok());
        assert!(validate_embedding_dim(&[0.0; 511], 512).is_err());
        assert!(validate_embedding_dim(&[0.0; 513], 512).is_err());
    }
}
