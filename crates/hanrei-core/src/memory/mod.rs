//! ============================================================================
//! Memory Module - Long-term semantic memory for the Soul
//! ============================================================================
//! Content-addressed memory records kept in a remote Pinecone index.
//!
//! ## Features
//! - Upsert records keyed by a hash of their text (re-remembering is a no-op)
//! - Top-K similarity recall, optionally narrowed by shared keywords
//! - Index discovery (project name, data plane URL, dimension) at connect time
//!
//! ## Architecture
//! ```text
//! Host text → EmbeddingService → Vec<f32>
//!                                   ↓
//!               Soul::remember / Soul::recall
//!                                   ↓
//!               VectorStore (upsert / query) → Pinecone
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use hanrei_core::memory::{EmbeddingService, MemoryRecord};
//!
//! let embeddings = EmbeddingService::new(api_key);
//! let vector = embeddings.embed_single("I like green tea").await?;
//! soul.remember(&vector, &MemoryRecord::new("I like green tea", "alice", vec!["tea".into()])).await;
//! ```
//! ============================================================================

mod embeddings;
mod store;
mod types;

pub use embeddings::{EmbeddingService, DEFAULT_EMBEDDING_MODEL, OPENAI_API_BASE};
pub use store::{controller_url, data_plane_url, VectorStore};
pub use types::{record_id, MemoryRecord, MEMORY_NAMESPACE};
