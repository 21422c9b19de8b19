//! ============================================================================
//! HANREI-CORE: the Soul
//! ============================================================================
//! Memory and reasoning orchestrator for a conversational agent:
//! - Long-term semantic memory in a remote Pinecone index
//! - Translate → compute → translate pipeline against Wolfram|Alpha
//! - Web search delegation
//! - Capability probing at init, soft-fail degradation per turn
//! ============================================================================

pub mod backend;
pub mod config;
pub mod memory;
pub mod soul;
pub mod types;

// Re-export main types for convenience
pub use backend::{SearchMode, SearchResult, TranslateMode};
pub use config::{Endpoints, SoulConfig};
pub use memory::{EmbeddingService, MemoryRecord, VectorStore};
pub use soul::Soul;
pub use types::*;
