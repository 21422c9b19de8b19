//! ============================================================================
//! Memory Types - Records stored in the long-term vector index
//! ============================================================================
//! Defines the memory record and its content-addressed identity.
//! ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Namespace for memory ids. Changing it orphans every stored record.
pub const MEMORY_NAMESPACE: Uuid = Uuid::from_u128(0x6b1c_52a4_0e3f_4d7a_9c85_21f0_d4e7_a913);

/// A single memory, stored as vector metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The remembered text; also the source of the record id
    pub text: String,
    /// Who said it
    pub speaker: String,
    /// Unix timestamp in milliseconds
    #[serde(deserialize_with = "millis_from_number")]
    pub timestamp: i64,
    /// Topic keywords, matched by the recall filter
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl MemoryRecord {
    /// Create a record stamped with the current time
    pub fn new(text: impl Into<String>, speaker: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            keywords,
        }
    }

    /// Deterministic id derived from the text alone
    pub fn id(&self) -> Uuid {
        record_id(&self.text)
    }

    /// True if any of this record's keywords appears in `filter`
    pub fn matches_any(&self, filter: &[String]) -> bool {
        self.keywords.iter().any(|k| filter.contains(k))
    }
}

// The index stores every metadata number as a float
fn millis_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value as i64)
}

/// UUIDv5 over the exact bytes of `text`
pub fn record_id(text: &str) -> Uuid {
    Uuid::new_v5(&MEMORY_NAMESPACE, text.as_bytes())
}
