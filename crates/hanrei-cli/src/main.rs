// ============================================================================
// hanrei — command-line host for the Soul
// ============================================================================
// Usage:
//   hanrei status                                  Probe backends, print modes
//   hanrei remember --text T [--keyword K]...      Store a long-term memory
//   hanrei recall --query Q [--keyword K]...       Recall related memories
//   hanrei compute "what is the speed of light"    Computed short answer
//   hanrei search "rust async runtimes"            Web search
// ============================================================================

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use hanrei_core::memory::{EmbeddingService, DEFAULT_EMBEDDING_MODEL, OPENAI_API_BASE};
use hanrei_core::{MemoryRecord, Soul, SoulConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Hanrei soul command-line host
#[derive(Parser)]
#[command(name = "hanrei", version, about = "Long-term memory, computation and search for a chat bot")]
struct Cli {
    /// JSON config file (default: ~/.hanrei/config.json, then environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep going when the vector store probe fails
    #[arg(long, global = true)]
    allow_degraded: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging for hanrei crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise the soul and show which backends are live
    Status,

    /// Embed a text and store it as a long-term memory
    Remember {
        #[arg(long)]
        text: String,

        #[arg(long, default_value = "user")]
        speaker: String,

        /// Topic keyword (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },

    /// Recall memories similar to a query
    Recall {
        #[arg(long)]
        query: String,

        /// Only memories sharing one of these keywords (repeatable)
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },

    /// Ask the compute engine for a short answer
    Compute { query: String },

    /// Search the web
    Search { query: String },
}

fn load_config(path: Option<&PathBuf>) -> Result<SoulConfig> {
    if let Some(path) = path {
        return SoulConfig::load(path);
    }

    if let Some(home) = dirs::home_dir() {
        let default_path = home.join(".hanrei").join("config.json");
        if default_path.exists() {
            return SoulConfig::load(&default_path);
        }
    }

    debug!("No config file, reading environment");
    Ok(SoulConfig::from_env())
}

fn embedding_service() -> Result<EmbeddingService> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is required to embed text"))?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| OPENAI_API_BASE.to_string());
    let model = std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

    Ok(EmbeddingService::new_custom(api_key, base_url, model))
}

/// Hanrei crates always log at info or above so soul warnings reach the
/// terminal; `RUST_LOG` still controls everything else.
fn log_filter(base: EnvFilter, verbose: bool) -> Result<EnvFilter> {
    let level = if verbose { "debug" } else { "info" };
    Ok(base
        .add_directive(format!("hanrei={}", level).parse()?)
        .add_directive(format!("hanrei_core={}", level).parse()?))
}

fn format_timestamp(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("(invalid: {})", ms))
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::from_default_env(), cli.verbose)?)
        .init();

    let config = load_config(cli.config.as_ref())?;

    let mut soul = Soul::new();
    if !soul.init(&config).await && !cli.allow_degraded {
        anyhow::bail!("Vector store probe failed (pass --allow-degraded to run without long-term memory)");
    }
    if soul.status().is_ready() {
        info!("Soul ready: {}", soul.status());
    } else {
        warn!("Soul running without long-term memory: {}", soul.status());
    }

    match cli.command {
        Commands::Status => cmd_status(&soul, cli.json),
        Commands::Remember {
            text,
            speaker,
            keywords,
        } => cmd_remember(&soul, text, speaker, keywords).await,
        Commands::Recall { query, keywords } => cmd_recall(&soul, &query, &keywords, cli.json).await,
        Commands::Compute { query } => cmd_compute(&soul, &query).await,
        Commands::Search { query } => cmd_search(&soul, &query, cli.json).await,
    }
}

fn cmd_status(soul: &Soul, json: bool) -> Result<()> {
    if json {
        let status = serde_json::json!({
            "status": soul.status(),
            "memory": soul.memory_mode().to_string(),
            "translate": soul.translate_mode(),
            "search": soul.search_mode(),
            "compute": soul.compute_enabled(),
            "dimension": soul.index_dimension(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("=== Hanrei Soul ===");
    println!("Status:    {}", soul.status());
    println!("Memory:    {}", soul.memory_mode());
    if let Some(store) = soul.memory_store() {
        println!("  Index:     {}/{}", store.region(), store.index());
        println!("  Endpoint:  {}", store.base_url());
        println!("  Dimension: {}", store.dimension());
        println!("  Top-K:     {}", soul.pinecone_top_k());
    }
    println!("Translate: {}", soul.translate_mode());
    println!("Search:    {} (top {})", soul.search_mode(), soul.search_top_k());
    println!("Compute:   {}", if soul.compute_enabled() { "Wolfram|Alpha" } else { "None" });
    println!("Locale:    {}", soul.working_locale());

    Ok(())
}

async fn cmd_remember(soul: &Soul, text: String, speaker: String, keywords: Vec<String>) -> Result<()> {
    let Some(store) = soul.memory_store() else {
        println!("Long-term memory is not configured; nothing stored.");
        return Ok(());
    };

    let embedding = embedding_service()?.embed_single(&text).await?;
    if embedding.len() != store.dimension() as usize {
        eprintln!(
            "Warning: embedding has {} dimensions, index expects {}",
            embedding.len(),
            store.dimension()
        );
    }

    let record = MemoryRecord::new(text, speaker, keywords);
    soul.remember(&embedding, &record).await;

    println!("Remembered {}", record.id());
    Ok(())
}

async fn cmd_recall(soul: &Soul, query: &str, keywords: &[String], json: bool) -> Result<()> {
    if soul.memory_store().is_none() {
        println!("Long-term memory is not configured.");
        return Ok(());
    }

    let embedding = embedding_service()?.embed_single(query).await?;
    let records = soul.recall(&embedding, keywords).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No memories found.");
        return Ok(());
    }

    println!("{:<22}  {:<12}  {:<24}  {}", "WHEN", "SPEAKER", "KEYWORDS", "TEXT");
    println!("{}", "-".repeat(90));
    for record in &records {
        println!(
            "{:<22}  {:<12}  {:<24}  {}",
            format_timestamp(record.timestamp),
            record.speaker,
            record.keywords.join(","),
            record.text
        );
    }
    println!("\nTotal: {} memories", records.len());
    Ok(())
}

async fn cmd_compute(soul: &Soul, query: &str) -> Result<()> {
    let answer = soul.compute(query).await;
    if answer.is_empty() {
        println!("(no answer)");
    } else {
        println!("{}", answer);
    }
    Ok(())
}

async fn cmd_search(soul: &Soul, query: &str, json: bool) -> Result<()> {
    let results = soul.search(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. {}\n   {}\n   {}\n", i + 1, result.title, result.url, result.snippet);
    }
    Ok(())
}
