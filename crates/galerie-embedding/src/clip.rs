//! HTTP client for the CLIP sidecar service.
//!
//! The sidecar exposes `POST /embed/image` (multipart file upload) and
//! `POST /embed/caption` (JSON body), both answering
//! `{"embedding": [f32; D]}` with vectors already normalized to unit length.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{check_dim, EmbeddingError, EmbeddingProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct CaptionRequest<'a> {
    caption: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// CLIP embedding service client.
#[derive(Clone)]
pub struct ClipHttpClient {
    http_client: reqwest::Client,
    base_url: String,
    dim: usize,
}

impl ClipHttpClient {
    pub fn new(base_url: impl Into<String>, dim: usize) -> Result<Self, EmbeddingError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                EmbeddingError::Unavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dim,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_embedding(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::InvalidInput(format!(
                "Embedding service rejected the payload ({}): {}",
                status, body
            )));
        }
        if !status.is_success() {
            return Err(EmbeddingError::Unavailable(format!(
                "Embedding service returned {}",
                status
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            EmbeddingError::Unavailable(format!("Invalid embedding response: {}", e))
        })?;

        check_dim(parsed.embedding, self.dim)
    }
}

#[async_trait]
impl EmbeddingProvider for ClipHttpClient {
    fn dim(&self) -> usize {
        self.dim
    }

    #[tracing::instrument(skip(self, data), fields(payload_bytes = data.len()))]
    async fn embed_image(&self, data: Bytes) -> Result<Vec<f32>, EmbeddingError> {
        let part = Part::stream(data)
            .file_name("image.jpg")
            .mime_str("application/octet-stream")
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.endpoint("/embed/image"))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        self.read_embedding(response).await
    }

    #[tracing::instrument(skip(self, caption), fields(caption_len = caption.len()))]
    async fn embed_text(&self, caption: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .http_client
            .post(self.endpoint("/embed/caption"))
            .json(&CaptionRequest { caption })
            .send()
            .await
            .map_err(map_transport_error)?;

        self.read_embedding(response).await
    }
}

fn map_transport_error(err: reqwest::Error) -> EmbeddingError {
    if let Some(status) = err.status() {
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            return EmbeddingError::InvalidInput(err.to_string());
        }
    }
    EmbeddingError::Unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ClipHttpClient::new("http://localhost:8000/", 512).unwrap();
        assert_eq!(
            client.endpoint("/embed/caption"),
            "http://localhost:8000/embed/caption"
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: EmbeddingResponse =
            serde_json::from_str(r#"{"size": 3, "embedding": [0.1, 0.2, 0.3]}"#).unwrap();
        assert_eq!(parsed.embedding, vec![0.1, 0.2, 0.3]);
    }
}
