//! ============================================================================
//! Compute Engine - Wolfram|Alpha short answers
//! ============================================================================
//! - Query recognizer: cheap check whether a query is computable at all
//! - Short answers API: one-line plain-text result
//! ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SoulConfig;
use crate::types::{SoulError, SoulResult};

/// Body returned by the short answers API when it cannot interpret a query
pub const NOT_UNDERSTOOD: &str = "Wolfram|Alpha did not understand your input";

/// Locale the engine expects its queries in
pub const ENGINE_LOCALE: &str = "en-US";

/// Symbolic computation service
#[async_trait]
pub trait ComputeEngine: Send + Sync {
    /// Pre-flight check, much cheaper than computing an answer
    async fn check_computable(&self, query: &str) -> SoulResult<bool>;

    /// Plain-text short answer for a query
    async fn short_answer(&self, query: &str) -> SoulResult<String>;
}

/// Wolfram|Alpha adapter
pub struct WolframEngine {
    client: Client,
    app_id: String,
    recognizer_url: String,
    result_url: String,
}

impl WolframEngine {
    pub fn new(client: Client, app_id: String, recognizer_url: String, result_url: String) -> Self {
        Self {
            client,
            app_id,
            recognizer_url,
            result_url,
        }
    }

    /// Build from config; `None` when no app id is set
    pub fn from_config(client: Client, config: &SoulConfig) -> Option<Self> {
        let app_id = config.wolfram_app_id()?;
        Some(Self::new(
            client,
            app_id.to_string(),
            config.endpoints.wolfram_recognizer.clone(),
            config.endpoints.wolfram_result.clone(),
        ))
    }
}

#[async_trait]
impl ComputeEngine for WolframEngine {
    async fn check_computable(&self, query: &str) -> SoulResult<bool> {
        let response = self
            .client
            .get(&self.recognizer_url)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("mode", "Default"),
                ("i", query),
                ("output", "json"),
            ])
            .send()
            .await
            .map_err(|e| SoulError::remote("Failed to call Wolfram query recognizer", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::status("Wolfram query recognizer", status, &body));
        }

        let parsed: RecognizerResponse = response
            .json()
            .await
            .map_err(|e| SoulError::MalformedResponse(format!("Wolfram query recognizer: {}", e)))?;

        let first = parsed
            .query
            .into_iter()
            .next()
            .ok_or_else(|| SoulError::MalformedResponse("recognizer returned no query".to_string()))?;

        let accepted = match first.accepted {
            serde_json::Value::Bool(b) => b,
            serde_json::Value::String(s) => s == "true",
            _ => false,
        };

        debug!("Wolfram recognizer accepted={} for: {}", accepted, query);
        Ok(accepted)
    }

    async fn short_answer(&self, query: &str) -> SoulResult<String> {
        let response = self
            .client
            .get(&self.result_url)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("i", query),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| SoulError::remote("Failed to call Wolfram short answers", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SoulError::remote("Failed to read Wolfram answer", e))?;

        if body.contains(NOT_UNDERSTOOD) {
            return Err(SoulError::MalformedResponse(NOT_UNDERSTOOD.to_string()));
        }
        if !status.is_success() {
            return Err(SoulError::status("Wolfram short answers", status, &body));
        }

        Ok(body.trim().to_string())
    }
}

// ============================================================================
// Wolfram API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RecognizerResponse {
    query: Vec<RecognizedQuery>,
}

#[derive(Debug, Deserialize)]
struct RecognizedQuery {
    #[serde(default)]
    accepted: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(server: &MockServer) -> WolframEngine {
        WolframEngine::new(
            Client::new(),
            "APP-123".to_string(),
            format!("{}/queryrecognizer/query.jsp", server.uri()),
            format!("{}/v1/result", server.uri()),
        )
    }

    #[test]
    fn test_from_config_requires_app_id() {
        assert!(WolframEngine::from_config(Client::new(), &SoulConfig::default()).is_none());

        let config = SoulConfig {
            wolfram_app_id: Some("APP-123".to_string()),
            ..Default::default()
        };
        assert!(WolframEngine::from_config(Client::new(), &config).is_some());
    }

    #[tokio::test]
    async fn test_recognizer_accepts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/queryrecognizer/query.jsp"))
            .and(query_param("appid", "APP-123"))
            .and(query_param("mode", "Default"))
            .and(query_param("i", "2+2"))
            .and(query_param("output", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": [{ "i": "2+2", "accepted": "true", "timing": "1.2", "domain": "math" }]
            })))
            .mount(&server)
            .await;

        assert!(engine(&server).check_computable("2+2").await.unwrap());
    }

    #[tokio::test]
    async fn test_recognizer_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/queryrecognizer/query.jsp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": [{ "i": "hello there", "accepted": "false" }]
            })))
            .mount(&server)
            .await;

        assert!(!engine(&server).check_computable("hello there").await.unwrap());
    }

    #[tokio::test]
    async fn test_recognizer_empty_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": [] })))
            .mount(&server)
            .await;

        let err = engine(&server).check_computable("x").await.unwrap_err();
        assert!(matches!(err, SoulError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_short_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/result"))
            .and(query_param("i", "speed of light"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_string("about 299792 kilometers per second\n"))
            .mount(&server)
            .await;

        let answer = engine(&server).short_answer("speed of light").await.unwrap();
        assert_eq!(answer, "about 299792 kilometers per second");
    }

    #[tokio::test]
    async fn test_short_answer_not_understood() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/result"))
            .respond_with(ResponseTemplate::new(501).set_body_string(NOT_UNDERSTOOD))
            .mount(&server)
            .await;

        let err = engine(&server).short_answer("blorp").await.unwrap_err();
        assert_eq!(err, SoulError::MalformedResponse(NOT_UNDERSTOOD.to_string()));
    }
}
