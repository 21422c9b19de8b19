//! ============================================================================
//! Translator - Locale conversion for the compute pipeline
//! ============================================================================
//! Azure Translator when a key is configured, otherwise text passes through
//! unchanged.
//! ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::{credential, SoulConfig};
use crate::types::{SoulError, SoulResult};

/// Azure Translator API version
const AZURE_API_VERSION: &str = "3.0";

/// Which translation backend is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslateMode {
    Passthrough,
    Azure,
}

impl std::fmt::Display for TranslateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateMode::Passthrough => write!(f, "None"),
            TranslateMode::Azure => write!(f, "Azure"),
        }
    }
}

/// Translates text into a target locale such as `en-US` or `zh-CN`
#[async_trait]
pub trait Translator: Send + Sync {
    fn mode(&self) -> TranslateMode;

    async fn translate(&self, text: &str, target_locale: &str) -> SoulResult<String>;
}

/// Pick the translator for a config
pub fn create_translator(client: Client, config: &SoulConfig) -> Arc<dyn Translator> {
    match config.translate_key() {
        Some(key) => {
            debug!("Using Azure Translator");
            Arc::new(AzureTranslator::new(
                client,
                key.to_string(),
                credential(&config.azure_translate_region).map(str::to_string),
                config.endpoints.azure_translator.clone(),
            ))
        }
        None => Arc::new(PassthroughTranslator),
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn mode(&self) -> TranslateMode {
        TranslateMode::Passthrough
    }

    async fn translate(&self, text: &str, _target_locale: &str) -> SoulResult<String> {
        Ok(text.to_string())
    }
}

/// Azure Cognitive Services Translator
pub struct AzureTranslator {
    client: Client,
    key: String,
    region: Option<String>,
    base_url: String,
}

impl AzureTranslator {
    pub fn new(client: Client, key: String, region: Option<String>, base_url: String) -> Self {
        Self {
            client,
            key,
            region,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    fn mode(&self) -> TranslateMode {
        TranslateMode::Azure
    }

    async fn translate(&self, text: &str, target_locale: &str) -> SoulResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let to = azure_language(target_locale);
        debug!("Translating {} chars to {}", text.chars().count(), to);

        let mut request = self
            .client
            .post(format!("{}/translate", self.base_url))
            .query(&[("api-version", AZURE_API_VERSION), ("to", to.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&[TranslateInput { text }]);

        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SoulError::remote("Failed to call Azure Translator", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::status("Azure Translator", status, &body));
        }

        let parsed: Vec<TranslateOutput> = response
            .json()
            .await
            .map_err(|e| SoulError::MalformedResponse(format!("Azure Translator: {}", e)))?;

        parsed
            .into_iter()
            .next()
            .and_then(|o| o.translations.into_iter().next())
            .map(|t| t.text)
            .ok_or_else(|| SoulError::MalformedResponse("Azure Translator returned no translation".to_string()))
    }
}

/// Map a BCP-47 locale onto the language codes Azure accepts
fn azure_language(locale: &str) -> String {
    match locale.to_ascii_lowercase().as_str() {
        "zh-cn" | "zh-sg" | "zh-hans" | "zh" => "zh-Hans".to_string(),
        "zh-tw" | "zh-hk" | "zh-hant" => "zh-Hant".to_string(),
        other => other.split('-').next().unwrap_or(other).to_string(),
    }
}

// ============================================================================
// Azure Translator API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TranslateInput<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateOutput {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_language_mapping() {
        assert_eq!(azure_language("en-US"), "en");
        assert_eq!(azure_language("zh-CN"), "zh-Hans");
        assert_eq!(azure_language("zh-TW"), "zh-Hant");
        assert_eq!(azure_language("ja"), "ja");
    }

    #[test]
    fn test_factory_selects_mode() {
        let passthrough = create_translator(Client::new(), &SoulConfig::default());
        assert_eq!(passthrough.mode(), TranslateMode::Passthrough);

        let config = SoulConfig {
            azure_translate_key: Some("az-key".to_string()),
            ..Default::default()
        };
        assert_eq!(create_translator(Client::new(), &config).mode(), TranslateMode::Azure);
    }

    #[tokio::test]
    async fn test_passthrough() {
        let out = PassthroughTranslator.translate("光速是多少", "en-US").await.unwrap();
        assert_eq!(out, "光速是多少");
    }

    #[tokio::test]
    async fn test_azure_translate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(query_param("api-version", "3.0"))
            .and(query_param("to", "en"))
            .and(header("Ocp-Apim-Subscription-Key", "az-key"))
            .and(header("Ocp-Apim-Subscription-Region", "eastasia"))
            .and(body_json(json!([{ "Text": "你好" }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "detectedLanguage": { "language": "zh-Hans", "score": 1.0 },
                  "translations": [{ "text": "Hello", "to": "en" }] }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let translator = AzureTranslator::new(
            Client::new(),
            "az-key".to_string(),
            Some("eastasia".to_string()),
            server.uri(),
        );
        assert_eq!(translator.translate("你好", "en-US").await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_azure_without_region_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "translations": [{ "text": "Bonjour", "to": "fr" }] }
            ])))
            .mount(&server)
            .await;

        let translator = AzureTranslator::new(Client::new(), "az-key".to_string(), None, server.uri());
        translator.translate("Hello", "fr").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("ocp-apim-subscription-region"));
    }

    #[tokio::test]
    async fn test_azure_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        let translator = AzureTranslator::new(Client::new(), "bad".to_string(), None, server.uri());
        let err = translator.translate("Hello", "fr").await.unwrap_err();
        assert!(matches!(err, SoulError::RemoteUnavailable(_)));
    }

    #[tokio::test]
    async fn test_azure_empty_text_skips_network() {
        let server = MockServer::start().await;
        let translator = AzureTranslator::new(Client::new(), "k".to_string(), None, server.uri());

        assert_eq!(translator.translate("  ", "en-US").await.unwrap(), "");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
