//! ============================================================================
//! Searcher - Web search for the Soul
//! ============================================================================
//! Bing Web Search v7 when a key is configured, otherwise disabled.
//! ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::SoulConfig;
use crate::types::{SoulError, SoulResult};

/// Which search backend is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    Disabled,
    Bing,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Disabled => write!(f, "None"),
            SearchMode::Bing => write!(f, "Bing"),
        }
    }
}

/// A single ranked web result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Ranked web search
#[async_trait]
pub trait Searcher: Send + Sync {
    fn mode(&self) -> SearchMode;

    async fn search(&self, query: &str, top_k: u32) -> SoulResult<Vec<SearchResult>>;
}

/// Pick the searcher for a config
pub fn create_searcher(client: Client, config: &SoulConfig) -> Arc<dyn Searcher> {
    match config.search_key() {
        Some(key) => {
            debug!("Using Bing web search");
            Arc::new(BingSearcher::new(
                client,
                key.to_string(),
                config.endpoints.bing_search.clone(),
            ))
        }
        None => Arc::new(DisabledSearcher),
    }
}

/// Always returns no results
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearcher;

#[async_trait]
impl Searcher for DisabledSearcher {
    fn mode(&self) -> SearchMode {
        SearchMode::Disabled
    }

    async fn search(&self, _query: &str, _top_k: u32) -> SoulResult<Vec<SearchResult>> {
        Ok(vec![])
    }
}

/// Bing Web Search API v7
pub struct BingSearcher {
    client: Client,
    key: String,
    base_url: String,
}

impl BingSearcher {
    pub fn new(client: Client, key: String, base_url: String) -> Self {
        Self {
            client,
            key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Searcher for BingSearcher {
    fn mode(&self) -> SearchMode {
        SearchMode::Bing
    }

    async fn search(&self, query: &str, top_k: u32) -> SoulResult<Vec<SearchResult>> {
        if top_k == 0 || query.trim().is_empty() {
            return Ok(vec![]);
        }

        debug!("Searching the web (top {}): {}", top_k, query);

        let count = top_k.to_string();
        let response = self
            .client
            .get(format!("{}/v7.0/search", self.base_url))
            .query(&[("q", query), ("count", count.as_str())])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .send()
            .await
            .map_err(|e| SoulError::remote("Failed to call Bing search", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SoulError::status("Bing search", status, &body));
        }

        let parsed: BingResponse = response
            .json()
            .await
            .map_err(|e| SoulError::MalformedResponse(format!("Bing search: {}", e)))?;

        let results: Vec<SearchResult> = parsed
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .take(top_k as usize)
            .map(|page| SearchResult {
                title: page.name,
                url: page.url,
                snippet: page.snippet,
            })
            .collect();

        debug!("Search returned {} results", results.len());
        Ok(results)
    }
}

// ============================================================================
// Bing API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
struct BingPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}
