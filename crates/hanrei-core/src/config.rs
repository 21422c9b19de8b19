//! ============================================================================
//! Soul Configuration
//! ============================================================================
//! Credentials and tunables for every optional backend. A missing or empty
//! credential is the only thing that switches a backend off.
//! ============================================================================

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default number of memories returned by recall
pub const DEFAULT_PINECONE_TOP_K: u32 = 5;

/// Default number of web results returned by search
pub const DEFAULT_SEARCH_TOP_K: u32 = 3;

/// Locale computed answers are translated back into
pub const DEFAULT_WORKING_LOCALE: &str = "zh-CN";

pub const WOLFRAM_RECOGNIZER_URL: &str = "http://www.wolframalpha.com/queryrecognizer/query.jsp";
pub const WOLFRAM_RESULT_URL: &str = "http://api.wolframalpha.com/v1/result";
pub const AZURE_TRANSLATOR_URL: &str = "https://api.cognitive.microsofttranslator.com";
pub const BING_SEARCH_URL: &str = "https://api.bing.microsoft.com";

/// Soul configuration, owned by the host and read once during init
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoulConfig {
    /// Emit informational logs (warnings are always emitted)
    pub log_enabled: bool,

    // Long-term memory (Pinecone)
    pub pinecone_key: Option<String>,
    pub pinecone_region: Option<String>,
    pub pinecone_index: Option<String>,
    pub pinecone_namespace: Option<String>,
    pub pinecone_top_k: u32,

    // Symbolic computation (Wolfram|Alpha)
    pub wolfram_app_id: Option<String>,

    // Translation (Azure Translator)
    pub azure_translate_key: Option<String>,
    pub azure_translate_region: Option<String>,

    // Web search (Bing)
    pub azure_search_key: Option<String>,
    pub search_top_k: u32,

    /// Locale the caller converses in
    pub working_locale: String,

    pub endpoints: Endpoints,
}

impl Default for SoulConfig {
    fn default() -> Self {
        Self {
            log_enabled: false,
            pinecone_key: None,
            pinecone_region: None,
            pinecone_index: None,
            pinecone_namespace: None,
            pinecone_top_k: DEFAULT_PINECONE_TOP_K,
            wolfram_app_id: None,
            azure_translate_key: None,
            azure_translate_region: None,
            azure_search_key: None,
            search_top_k: DEFAULT_SEARCH_TOP_K,
            working_locale: DEFAULT_WORKING_LOCALE.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Base URLs of the remote services. Defaults point at the public APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Pinecone controller; derived from the region when unset
    pub pinecone_controller: Option<String>,
    /// Pinecone index data plane; derived from index/project/region when unset
    pub pinecone_data_plane: Option<String>,
    pub wolfram_recognizer: String,
    pub wolfram_result: String,
    pub azure_translator: String,
    pub bing_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pinecone_controller: None,
            pinecone_data_plane: None,
            wolfram_recognizer: WOLFRAM_RECOGNIZER_URL.to_string(),
            wolfram_result: WOLFRAM_RESULT_URL.to_string(),
            azure_translator: AZURE_TRANSLATOR_URL.to_string(),
            bing_search: BING_SEARCH_URL.to_string(),
        }
    }
}

impl SoulConfig {
    /// Build a config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_enabled: env_flag("SOUL_LOG"),
            pinecone_key: env_opt("PINECONE_KEY"),
            pinecone_region: env_opt("PINECONE_REGION"),
            pinecone_index: env_opt("PINECONE_INDEX"),
            pinecone_namespace: env_opt("PINECONE_NAMESPACE"),
            pinecone_top_k: env_num("PINECONE_TOP_K").unwrap_or(defaults.pinecone_top_k),
            wolfram_app_id: env_opt("WOLFRAM_APP_ID"),
            azure_translate_key: env_opt("AZURE_TRANSLATE_KEY"),
            azure_translate_region: env_opt("AZURE_TRANSLATE_REGION"),
            azure_search_key: env_opt("AZURE_SEARCH_KEY"),
            search_top_k: env_num("SEARCH_TOP_K").unwrap_or(defaults.search_top_k),
            working_locale: env_opt("SOUL_LOCALE").unwrap_or(defaults.working_locale),
            endpoints: defaults.endpoints,
        }
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading soul config from {}", path.display());

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))
    }

    pub fn memory_key(&self) -> Option<&str> {
        credential(&self.pinecone_key)
    }

    pub fn wolfram_app_id(&self) -> Option<&str> {
        credential(&self.wolfram_app_id)
    }

    pub fn translate_key(&self) -> Option<&str> {
        credential(&self.azure_translate_key)
    }

    pub fn search_key(&self) -> Option<&str> {
        credential(&self.azure_search_key)
    }

    pub fn memory_enabled(&self) -> bool {
        self.memory_key().is_some()
    }

    pub fn compute_enabled(&self) -> bool {
        self.wolfram_app_id().is_some()
    }
}

/// Treat empty strings the same as unset fields
pub(crate) fn credential(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_num(name: &str) -> Option<u32> {
    env_opt(name).and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str) -> bool {
    matches!(
        env_opt(name).as_deref().map(str::to_lowercase).as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SoulConfig::default();
        assert_eq!(config.pinecone_top_k, 5);
        assert_eq!(config.search_top_k, 3);
        assert_eq!(config.working_locale, "zh-CN");
        assert!(!config.memory_enabled());
        assert!(!config.compute_enabled());
        assert_eq!(config.endpoints.wolfram_result, WOLFRAM_RESULT_URL);
    }

    #[test]
    fn test_empty_credentials_are_absent() {
        let config = SoulConfig {
            pinecone_key: Some("".to_string()),
            wolfram_app_id: Some("   ".to_string()),
            azure_search_key: Some("bing-key".to_string()),
            ..Default::default()
        };

        assert!(!config.memory_enabled());
        assert!(!config.compute_enabled());
        assert_eq!(config.search_key(), Some("bing-key"));
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"pinecone_key": "pc-key", "pinecone_top_k": 8, "endpoints": {{"bing_search": "http://localhost:9"}}}}"#
        )
        .unwrap();

        let config = SoulConfig::load(file.path()).unwrap();
        assert_eq!(config.memory_key(), Some("pc-key"));
        assert_eq!(config.pinecone_top_k, 8);
        assert_eq!(config.search_top_k, DEFAULT_SEARCH_TOP_K);
        assert_eq!(config.endpoints.bing_search, "http://localhost:9");
        assert_eq!(config.endpoints.azure_translator, AZURE_TRANSLATOR_URL);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SoulConfig::load(Path::new("/nonexistent/hanrei.json"));
        assert!(result.is_err());
    }
}
