//! Text embedding through an Ollama server.
//!
//! The index never computes vectors itself; it hands text to an
//! [`EmbeddingProvider`] and stores whatever comes back.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::model::endpoint;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("embedding provider returned invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid input text: {0}")]
    InvalidInput(String),
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds every text, returning vectors in input order.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding returned".into()))
    }

    fn model_name(&self) -> &str;
}

#[derive(Clone)]
pub struct OllamaEmbedder {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> EmbeddingResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|text| text.trim().is_empty()) {
            return Err(EmbeddingError::InvalidInput(
                "all texts must be non-empty".into(),
            ));
        }

        let url = endpoint(&self.base_url, "/api/embed");
        info!(
            model = self.model.as_str(),
            inputs = texts.len(),
            "Requesting embeddings"
        );
        let response: EmbedResponse = self
            .http
            .post(url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        debug!(
            dimension = response.embeddings.first().map(Vec::len).unwrap_or(0),
            "Received embeddings"
        );
        Ok(response.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text");
        let vectors = embedder.embed_batch(&[]).await.expect("no request needed");
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_request() {
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text");
        let err = embedder
            .embed_batch(&["ok".to_string(), "   ".to_string()])
            .await
            .expect_err("blank text rejected");
        assert!(matches!(err, EmbeddingError::InvalidInput(_)));
    }

    #[test]
    fn request_serializes_input_array() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbedRequest {
            model: "m",
            input: &texts,
        })
        .expect("serializable");
        assert_eq!(body["model"], "m");
        assert_eq!(body["input"].as_array().map(Vec::len), Some(2));
    }
}
