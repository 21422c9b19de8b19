//! ============================================================================
//! Vector Store - Pinecone index operations over REST
//! ============================================================================
//! Resolves the project-qualified index endpoint once, then upserts and
//! queries memory records by vector similarity.
//! ============================================================================

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::MemoryRecord;
use crate::config::{credential, SoulConfig};
use crate::types::{SoulError, SoulResult};

/// Header carrying the Pinecone API key
const API_KEY_HEADER: &str = "Api-Key";

/// Controller URL for a Pinecone region
pub fn controller_url(region: &str) -> String {
    format!("https://controller.{}.pinecone.io", region)
}

/// Data plane URL for an index inside a project
pub fn data_plane_url(index: &str, project_name: &str, region: &str) -> String {
    format!("https://{}-{}.svc.{}.pinecone.io", index, project_name, region)
}

/// Remote vector index holding memory records
#[derive(Debug, Clone)]
pub struct VectorStore {
    client: Client,
    api_key: String,
    region: String,
    index: String,
    project_name: String,
    base_url: String,
    dimension: u32,
    namespace: Option<String>,
    top_k: u32,
}

impl VectorStore {
    /// Discover the index: resolve the project name, derive the data plane
    /// URL and fetch the index dimension.
    pub async fn connect(client: Client, config: &SoulConfig) -> SoulResult<Self> {
        let api_key = config
            .memory_key()
            .ok_or(SoulError::ConfigAbsent("pinecone_key"))?
            .to_string();
        let region = credential(&config.pinecone_region)
            .ok_or_else(|| SoulError::InitFailure("pinecone_region is not set".to_string()))?
            .to_string();
        let index = credential(&config.pinecone_index)
            .ok_or_else(|| SoulError::InitFailure("pinecone_index is not set".to_string()))?
            .to_string();

        let controller = config
            .endpoints
            .pinecone_controller
            .clone()
            .unwrap_or_else(|| controller_url(&region));

        debug!("Resolving Pinecone project via {}", controller);
        let whoami: WhoAmIResponse =
            get_json(&client, &format!("{}/actions/whoami", controller), &api_key).await?;
        let project_name = whoami.project_name;

        let base_url = config
            .endpoints
            .pinecone_data_plane
            .clone()
            .unwrap_or_else(|| data_plane_url(&index, &project_name, &region));

        let described: DescribeIndexResponse =
            get_json(&client, &format!("{}/databases/{}", controller, index), &api_key).await?;
        let dimension = described
            .database
            .dimension
            .filter(|d| *d > 0)
            .ok_or_else(|| SoulError::MalformedResponse("index description has no dimension".to_string()))?;

        debug!("Pinecone index {} at {} (dimension {})", index, base_url, dimension);

        Ok(Self {
            client,
            api_key,
            region,
            index,
            project_name,
            base_url,
            dimension,
            namespace: credential(&config.pinecone_namespace).map(str::to_string),
            top_k: config.pinecone_top_k,
        })
    }

    /// Upsert one record keyed by its content hash; returns the upserted count
    pub async fn upsert(&self, embedding: &[f32], record: &MemoryRecord) -> SoulResult<u32> {
        let id = record.id().to_string();
        debug!("Upserting memory {} ({} dims)", id, embedding.len());

        let request = UpsertRequest {
            vectors: vec![VectorEntry {
                id,
                values: embedding,
                metadata: record,
            }],
            namespace: self.namespace.as_deref(),
        };

        let response: UpsertResponse = self.post_json("vectors/upsert", &request).await?;
        response
            .upserted_count
            .ok_or_else(|| SoulError::MalformedResponse("upsert response has no upsertedCount".to_string()))
    }

    /// Top-K similarity query, optionally restricted to records sharing a keyword
    pub async fn query(&self, embedding: &[f32], keywords: &[String]) -> SoulResult<Vec<MemoryRecord>> {
        let request = QueryRequest {
            top_k: self.top_k,
            include_values: false,
            include_metadata: true,
            vector: embedding,
            namespace: self.namespace.as_deref(),
            filter: (!keywords.is_empty()).then(|| KeywordFilter {
                keywords: InFilter { any_of: keywords },
            }),
        };

        let response: QueryResponse = self.post_json("query", &request).await?;

        let records: Vec<MemoryRecord> = response
            .matches
            .into_iter()
            .filter_map(|m| serde_json::from_value(m.metadata?).ok())
            .collect();

        debug!("Query returned {} memories", records.len());
        Ok(records)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> SoulResult<T> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SoulError::remote("Pinecone request failed", e))?;

        parse_response(response).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str, api_key: &str) -> SoulResult<T> {
    let response = client
        .get(url)
        .header(API_KEY_HEADER, api_key)
        .send()
        .await
        .map_err(|e| SoulError::remote("Pinecone controller request failed", e))?;

    parse_response(response).await
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> SoulResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SoulError::remote("Failed to read Pinecone response", e))?;

    if !status.is_success() {
        return Err(SoulError::status("Pinecone", status, &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| SoulError::MalformedResponse(format!("Pinecone: {} - body: {}", e, body)))
}

// ============================================================================
// Pinecone API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct WhoAmIResponse {
    project_name: String,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    database: IndexDatabase,
}

#[derive(Debug, Deserialize)]
struct IndexDatabase {
    dimension: Option<u32>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<VectorEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct VectorEntry<'a> {
    id: String,
    values: &'a [f32],
    metadata: &'a MemoryRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    top_k: u32,
    include_values: bool,
    include_metadata: bool,
    vector: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<KeywordFilter<'a>>,
}

#[derive(Debug, Serialize)]
struct KeywordFilter<'a> {
    keywords: InFilter<'a>,
}

#[derive(Debug, Serialize)]
struct InFilter<'a> {
    #[serde(rename = "$in")]
    any_of: &'a [String],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}
