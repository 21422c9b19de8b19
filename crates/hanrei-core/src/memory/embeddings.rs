//! ============================================================================
//! Embedder - turns memory text into vectors
//! ============================================================================
//! The Soul never computes vectors itself. Hosts call this client against any
//! OpenAI-style `/embeddings` endpoint and hand the result to remember/recall.
//! ============================================================================

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model used when the host does not pick one
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Public OpenAI endpoint
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-style embeddings endpoint
pub struct EmbeddingService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl EmbeddingService {
    pub fn new(api_key: String) -> Self {
        Self::new_custom(api_key, OPENAI_API_BASE.to_string(), DEFAULT_EMBEDDING_MODEL.to_string())
    }

    /// Point at a self-hosted or proxy endpoint; a trailing slash is ignored
    pub fn new_custom(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Vectors for `texts`, returned in the same order as the input
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbedBody {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .context("Embedder unreachable")?;

        let status = response.status();
        let raw = response.text().await.context("Embedder reply could not be read")?;

        if !status.is_success() {
            let reason = serde_json::from_str::<EmbedFailure>(&raw)
                .map(|f| f.error.message)
                .unwrap_or(raw);
            return Err(anyhow!("Embedder rejected request ({}): {}", status, reason));
        }

        let reply: EmbedReply = serde_json::from_str(&raw)
            .with_context(|| format!("Embedder reply is not an embedding list: {}", raw))?;

        if let Some(usage) = reply.usage {
            debug!("Embedder consumed {} tokens", usage.total_tokens);
        }

        // Entries may arrive out of order; `index` points back into the input
        let mut items = reply.data;
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }

    pub async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| anyhow!("Embedder returned no vector for the text"))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// === Embeddings API Types ===

#[derive(Serialize)]
struct EmbedBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedReply {
    data: Vec<EmbedItem>,
    #[serde(default)]
    usage: Option<EmbedUsage>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize)]
struct EmbedUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct EmbedFailure {
    error: EmbedFailureDetail,
}

#[derive(Deserialize)]
struct EmbedFailureDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_service_creation() {
        let service = EmbeddingService::new("test-key".to_string());
        assert_eq!(service.base_url(), OPENAI_API_BASE);
        assert_eq!(service.model(), DEFAULT_EMBEDDING_MODEL);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let service = EmbeddingService::new("test-key".to_string());
        let result = service.embed(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_embeddings_sorted_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "embedding": [0.0, 1.0], "index": 1 },
                    { "embedding": [1.0, 0.0], "index": 0 }
                ],
                "model": "text-embedding-ada-002",
                "usage": { "prompt_tokens": 4, "total_tokens": 4 }
            })))
            .mount(&server)
            .await;

        let service = EmbeddingService::new_custom(
            "sk-test".to_string(),
            format!("{}/", server.uri()),
            DEFAULT_EMBEDDING_MODEL.to_string(),
        );
        let vectors = service
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let service = EmbeddingService::new_custom(
            "bad".to_string(),
            server.uri(),
            DEFAULT_EMBEDDING_MODEL.to_string(),
        );
        let err = service.embed_single("hello").await.unwrap_err();
        assert!(err.to_string().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_error_body_without_json_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let service = EmbeddingService::new_custom("k".to_string(), server.uri(), "m".to_string());
        let err = service.embed_single("hello").await.unwrap_err();
        assert!(err.to_string().contains("upstream down"));
    }
}
