//! Error types module
//!
//! All errors are unified under the `AppError` enum which can represent
//! validation, authorization, provider, and repository failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx`
//! feature. With `default-features = false`, `AppError` carries database
//! errors as plain strings.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad size, type, or item count. Local check, no side effects to undo.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Owner mismatch. Only the saga layer produces this; repositories
    /// report `NotFound` instead so existence never leaks across the
    /// repository boundary.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Embedding provider or blob store failure. Triggers compensation
    /// when a sibling step already applied a side effect.
    #[error("Provider error: {0}")]
    Provider(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("UUID parsing error: {}", err))
    }
}

impl AppError {
    /// Get the error type name for reporting
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Provider(_) => "Provider",
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Client-facing message. Validation, authorization, and not-found
    /// errors are precise and actionable; provider and repository failures
    /// stay generic so internal detail never reaches the caller.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Provider(_) => "Failed to process media".to_string(),
            AppError::Database(_) => "Failed to access metadata store".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Whether a failed step with applied side effects must be compensated.
    pub fn triggers_compensation(&self) -> bool {
        matches!(
            self,
            AppError::Provider(_) | AppError::Database(_) | AppError::Internal(_)
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_reaches_client() {
        let err = AppError::Validation("File exceeds the 5 MiB limit".to_string());
        assert_eq!(err.error_type(), "Validation");
        assert_eq!(err.client_message(), "File exceeds the 5 MiB limit");
        assert!(!err.triggers_compensation());
    }

    #[test]
    fn test_provider_message_is_generic() {
        let err = AppError::Provider("connection refused to 10.0.0.3:8000".to_string());
        assert_eq!(err.client_message(), "Failed to process media");
        assert!(err.triggers_compensation());
    }

    #[test]
    fn test_database_message_is_generic() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.error_type(), "Database");
        assert_eq!(err.client_message(), "Failed to access metadata store");
        assert!(err.triggers_compensation());
    }

    #[test]
    fn test_forbidden_is_distinct_from_not_found() {
        let forbidden = AppError::Forbidden("Not authorized to delete this image".to_string());
        let missing = AppError::NotFound("Image not found".to_string());
        assert_eq!(forbidden.error_type(), "Forbidden");
        assert_eq!(missing.error_type(), "NotFound");
        assert!(!forbidden.triggers_compensation());
    }
}
