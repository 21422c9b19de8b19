//! ============================================================================
//! Soul - Memory and reasoning orchestrator
//! ============================================================================
//! Composes the vector store, translator, searcher and compute engine behind
//! one interface. Backends are probed once in `init`; afterwards every
//! per-turn call degrades to an empty result instead of failing the turn.
//! ============================================================================

use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::{
    create_searcher, create_translator, ComputeEngine, DisabledSearcher, PassthroughTranslator,
    SearchMode, SearchResult, Searcher, TranslateMode, Translator, WolframEngine, ENGINE_LOCALE,
};
use crate::config::{SoulConfig, DEFAULT_PINECONE_TOP_K, DEFAULT_SEARCH_TOP_K, DEFAULT_WORKING_LOCALE};
use crate::memory::{MemoryRecord, VectorStore};
use crate::types::{Capability, MemoryMode, SoulResult, SoulStatus};

/// The orchestrator. Construct, `init` once, then share behind an `Arc`.
pub struct Soul {
    client: Client,
    status: SoulStatus,
    log_enabled: bool,
    memory: Capability<VectorStore>,
    compute: Capability<Arc<dyn ComputeEngine>>,
    translator: Arc<dyn Translator>,
    searcher: Arc<dyn Searcher>,
    pinecone_top_k: u32,
    search_top_k: u32,
    working_locale: String,
}

impl Default for Soul {
    fn default() -> Self {
        Self::new()
    }
}

impl Soul {
    /// An uninitialized soul with its own HTTP client
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// An uninitialized soul sharing the host's HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            status: SoulStatus::Uninitialized,
            log_enabled: false,
            memory: Capability::Disabled,
            compute: Capability::Disabled,
            translator: Arc::new(PassthroughTranslator),
            searcher: Arc::new(DisabledSearcher),
            pinecone_top_k: DEFAULT_PINECONE_TOP_K,
            search_top_k: DEFAULT_SEARCH_TOP_K,
            working_locale: DEFAULT_WORKING_LOCALE.to_string(),
        }
    }

    /// Probe configured backends. Returns `false` when the vector store is
    /// configured but cannot be reached; the soul then keeps running without
    /// long-term memory.
    pub async fn init(&mut self, config: &SoulConfig) -> bool {
        self.status = SoulStatus::Initializing;

        self.log_enabled = config.log_enabled;
        self.pinecone_top_k = config.pinecone_top_k;
        self.search_top_k = config.search_top_k;
        self.working_locale = config.working_locale.clone();

        self.translator = create_translator(self.client.clone(), config);
        self.searcher = create_searcher(self.client.clone(), config);
        self.compute = WolframEngine::from_config(self.client.clone(), config)
            .map(|engine| Arc::new(engine) as Arc<dyn ComputeEngine>)
            .into();
        self.memory = Capability::Disabled;

        if self.log_enabled {
            let memory_mode = if config.memory_enabled() {
                MemoryMode::LongAndCache
            } else {
                MemoryMode::CacheOnly
            };
            info!(
                "Mem({}), TransL({}), Search({})",
                memory_mode,
                self.translator.mode(),
                self.searcher.mode()
            );
        }

        if config.memory_enabled() {
            match VectorStore::connect(self.client.clone(), config).await {
                Ok(store) => {
                    if self.log_enabled {
                        info!(
                            "Pinecone: {}/{}, Dimension: {}",
                            store.region(),
                            store.index(),
                            store.dimension()
                        );
                    }
                    self.memory = Capability::Enabled(store);
                }
                Err(e) => {
                    warn!(
                        "Pinecone failed, please check your API fields or the internet connection: {}",
                        e
                    );
                    self.status = SoulStatus::Failed;
                    return false;
                }
            }
        }

        self.status = SoulStatus::Ready {
            degraded: self.is_degraded(),
        };
        debug!("Soul is {}", self.status);
        true
    }

    /// Store a memory. Best-effort: failures are logged, never returned.
    pub async fn remember(&self, embedding: &[f32], record: &MemoryRecord) {
        let Capability::Enabled(store) = &self.memory else {
            return;
        };

        match store.upsert(embedding, record).await {
            Ok(count) => {
                if self.log_enabled {
                    info!("Pinecone upserted {} vectors", count);
                }
            }
            Err(e) => warn!("Pinecone could not remember {}: {}", record.id(), e),
        }
    }

    /// Nearest memories first. Empty when memory is off or the query fails.
    pub async fn recall(&self, embedding: &[f32], keywords: &[String]) -> Vec<MemoryRecord> {
        let Capability::Enabled(store) = &self.memory else {
            return vec![];
        };

        match store.query(embedding, keywords).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Pinecone recall failed: {}", e);
                vec![]
            }
        }
    }

    /// Translate → pre-check → short answer → translate back.
    /// Empty string means "no computed answer".
    pub async fn compute(&self, query: &str) -> String {
        let Capability::Enabled(engine) = &self.compute else {
            return String::new();
        };

        match self.run_compute(engine.as_ref(), query).await {
            Ok(Some(answer)) => answer,
            Ok(None) => String::new(),
            Err(e) => {
                warn!("Compute failed: {}", e);
                String::new()
            }
        }
    }

    async fn run_compute(&self, engine: &dyn ComputeEngine, query: &str) -> SoulResult<Option<String>> {
        let engine_query = self.translator.translate(query, ENGINE_LOCALE).await?;

        let computable = match engine.check_computable(&engine_query).await {
            Ok(accepted) => accepted,
            Err(e) => {
                debug!("Treating query as not computable: {}", e);
                false
            }
        };
        if !computable {
            return Ok(None);
        }

        let answer = engine.short_answer(&engine_query).await?;
        let localized = self.translator.translate(&answer, &self.working_locale).await?;
        Ok(Some(localized))
    }

    /// Web search with the configured top-K
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.searcher.search(query, self.search_top_k).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Search failed: {}", e);
                vec![]
            }
        }
    }

    fn is_degraded(&self) -> bool {
        !self.memory.is_enabled()
            || !self.compute.is_enabled()
            || self.translator.mode() == TranslateMode::Passthrough
            || self.searcher.mode() == SearchMode::Disabled
    }

    pub fn status(&self) -> SoulStatus {
        self.status
    }

    pub fn memory_mode(&self) -> MemoryMode {
        if self.memory.is_enabled() {
            MemoryMode::LongAndCache
        } else {
            MemoryMode::CacheOnly
        }
    }

    pub fn translate_mode(&self) -> TranslateMode {
        self.translator.mode()
    }

    pub fn search_mode(&self) -> SearchMode {
        self.searcher.mode()
    }

    pub fn compute_enabled(&self) -> bool {
        self.compute.is_enabled()
    }

    /// Resolved vector store, when long-term memory is live
    pub fn memory_store(&self) -> Option<&VectorStore> {
        self.memory.enabled()
    }

    pub fn index_dimension(&self) -> Option<u32> {
        self.memory.enabled().map(VectorStore::dimension)
    }

    pub fn pinecone_top_k(&self) -> u32 {
        self.pinecone_top_k
    }

    pub fn search_top_k(&self) -> u32 {
        self.search_top_k
    }

    pub fn working_locale(&self) -> &str {
        &self.working_locale
    }
}
