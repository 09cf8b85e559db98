//! Configuration module
//!
//! Deployment configuration for the gallery: metadata store, blob store
//! backend, embedding provider endpoint, repository variant, and the
//! similarity metric. Everything is resolved once at startup from the
//! environment; nothing is re-derived at query time.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::similarity::Metric;

const EMBEDDING_DIM: usize = 512;
const MAX_FILE_SIZE_BYTES: usize = 5 * 1024 * 1024;
const MAX_BATCH_ITEMS: usize = 50;
const SEARCH_TOP_K: usize = 3;
const DB_MAX_CONNECTIONS: u32 = 20;
const DB_TIMEOUT_SECS: u64 = 30;

/// Blob store backend types, selected at deployment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Media repository variants. `Scan` loads the owner's records and ranks
/// client-side (exact); `Indexed` pushes the owner filter and K down to the
/// vector index (approximate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    Scan,
    Indexed,
}

impl FromStr for RepositoryBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" => Ok(RepositoryBackend::Scan),
            "indexed" => Ok(RepositoryBackend::Indexed),
            _ => Err(anyhow::anyhow!("Invalid repository backend: {}", s)),
        }
    }
}

impl Display for RepositoryBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RepositoryBackend::Scan => write!(f, "scan"),
            RepositoryBackend::Indexed => write!(f, "indexed"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,

    // Blob store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,

    // Embedding provider
    pub embedding_service_url: String,
    pub embedding_dim: usize,

    // Repository / search
    pub repository_backend: RepositoryBackend,
    pub similarity_metric: Metric,
    pub search_top_k: usize,

    // Upload validation
    pub max_file_size_bytes: usize,
    pub max_batch_items: usize,
    pub allowed_content_types: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let embedding_service_url = env::var("EMBEDDING_SERVICE_URL")
            .map_err(|_| anyhow::anyhow!("EMBEDDING_SERVICE_URL must be set"))?;

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let repository_backend = env::var("REPOSITORY_BACKEND")
            .unwrap_or_else(|_| "scan".to_string())
            .parse::<RepositoryBackend>()?;

        let similarity_metric = env::var("SIMILARITY_METRIC")
            .unwrap_or_else(|_| "cosine".to_string())
            .parse::<Metric>()?;

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        Ok(Config {
            database_url,
            db_max_connections: parse_env_or("DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS),
            db_timeout_seconds: parse_env_or("DB_TIMEOUT_SECONDS", DB_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok().or_else(|| env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            embedding_service_url,
            embedding_dim: parse_env_or("EMBEDDING_DIM", EMBEDDING_DIM),
            repository_backend,
            similarity_metric,
            search_top_k: parse_env_or("SEARCH_TOP_K", SEARCH_TOP_K),
            max_file_size_bytes: parse_env_or("MAX_FILE_SIZE_BYTES", MAX_FILE_SIZE_BYTES),
            max_batch_items: parse_env_or("MAX_BATCH_ITEMS", MAX_BATCH_ITEMS),
            allowed_content_types,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.embedding_dim == 0 {
            return Err(anyhow::anyhow!("EMBEDDING_DIM must be greater than zero"));
        }
        if self.search_top_k == 0 {
            return Err(anyhow::anyhow!("SEARCH_TOP_K must be greater than zero"));
        }
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET not configured"));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!("S3_REGION or AWS_REGION not configured"));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!("LOCAL_STORAGE_PATH not configured"));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!("LOCAL_STORAGE_BASE_URL not configured"));
                }
            }
        }
        Ok(())
    }
}

fn parse_env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "Local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());

        assert_eq!(
            "scan".parse::<RepositoryBackend>().unwrap(),
            RepositoryBackend::Scan
        );
        assert_eq!(
            "INDEXED".parse::<RepositoryBackend>().unwrap(),
            RepositoryBackend::Indexed
        );
        assert!("milvus".parse::<RepositoryBackend>().is_err());
    }

    #[test]
    fn test_backend_display_round_trip() {
        for backend in [RepositoryBackend::Scan, RepositoryBackend::Indexed] {
            assert_eq!(
                backend.to_string().parse::<RepositoryBackend>().unwrap(),
                backend
            );
        }
    }
}
