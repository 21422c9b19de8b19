//! ============================================================================
//! Backend Module - Optional external services behind the Soul
//! ============================================================================
//! Each backend is selected from configuration once, at init:
//! - Translator: Azure Translator, or pass-through
//! - Searcher: Bing Web Search, or disabled
//! - ComputeEngine: Wolfram|Alpha (query recognizer + short answers)
//! ============================================================================

mod compute;
mod search;
mod translate;

pub use compute::{ComputeEngine, WolframEngine, ENGINE_LOCALE, NOT_UNDERSTOOD};
pub use search::{create_searcher, BingSearcher, DisabledSearcher, SearchMode, SearchResult, Searcher};
pub use translate::{create_translator, AzureTranslator, PassthroughTranslator, TranslateMode, Translator};
