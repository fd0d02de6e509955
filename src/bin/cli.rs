//! Smoke CLI for the support RAG pipeline
//!
//! Ingests a reference document, builds (or reloads) the vector index,
//! and answers questions from stdin with conversation history.
//!
//! Run with: cargo run --bin support-rag-cli -- --document docs/faq.txt

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use support_rag::config::RagConfig;
use support_rag::ingestion::{DocumentLoader, TextChunker, TextFileLoader};
use support_rag::providers::{OllamaClient, OllamaEmbedder, OllamaGenerator};
use support_rag::types::ConversationTurn;
use support_rag::{RagPipeline, VectorIndex};

#[derive(Parser, Debug)]
#[command(name = "support-rag-cli", about = "Ask questions against a support document")]
struct Args {
    /// Reference document to answer from (plain text or markdown)
    #[arg(long)]
    document: PathBuf,

    /// Optional TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rebuild the index even if a saved one exists
    #[arg(long)]
    rebuild: bool,

    /// Ask a single question and exit instead of starting the prompt loop
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "support_rag=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::default(),
    };
    config.validate()?;

    tracing::info!("Embedding model: {}", config.embedding.model);
    tracing::info!("Generation model: {}", config.llm.generate_model);
    tracing::info!("Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);

    let client = Arc::new(OllamaClient::new(&config.llm)?);
    if !client.health_check().await? {
        tracing::warn!("Provider not reachable at {}", config.llm.base_url);
        tracing::warn!("Start Ollama and pull the models:");
        tracing::warn!("  ollama pull {}", config.embedding.model);
        tracing::warn!("  ollama pull {}", config.llm.generate_model);
    }
    let embedder = Arc::new(OllamaEmbedder::new(Arc::clone(&client), &config.embedding));
    let generator = Arc::new(OllamaGenerator::new(client, &config.llm));

    // Reuse a saved index when one exists; otherwise chunk, embed, save.
    let storage = &config.index.storage_path;
    let index = if !args.rebuild && VectorIndex::exists(storage) {
        match VectorIndex::load(storage) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Saved index unusable ({}), rebuilding", e);
                build_index(&args.document, &config, embedder.as_ref()).await?
            }
        }
    } else {
        build_index(&args.document, &config, embedder.as_ref()).await?
    };

    let pipeline = RagPipeline::from_providers(Arc::new(index), embedder, generator, &config)?;

    if let Some(question) = &args.question {
        let result = pipeline.query(question, &[]).await;
        print_result(&result);
        return Ok(());
    }

    println!("Ask a question (empty line to quit):");
    let stdin = std::io::stdin();
    let mut history: Vec<ConversationTurn> = Vec::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        let result = pipeline.query(question, &history).await;
        print_result(&result);

        history.push(ConversationTurn::user(question));
        history.push(ConversationTurn::assistant(result.answer.clone()));
    }

    Ok(())
}

async fn build_index(
    document: &PathBuf,
    config: &RagConfig,
    embedder: &OllamaEmbedder,
) -> anyhow::Result<VectorIndex> {
    tracing::info!("Ingesting {}", document.display());
    let pages = TextFileLoader::new().load(document)?;
    let chunker = TextChunker::from_config(&config.chunking)?;
    let chunks = chunker.split(&pages);
    tracing::info!("Created {} chunks from {} pages", chunks.len(), pages.len());

    let index = VectorIndex::build(chunks, embedder, config.embedding.batch_size).await?;
    index.save(&config.index.storage_path)?;
    Ok(index)
}

fn print_result(result: &support_rag::QueryResult) {
    println!("\n{}\n", result.answer);
    if !result.sources.is_empty() {
        println!("Sources ({} retrieved):", result.source_count);
        for source in &result.sources {
            let page = source
                .metadata
                .get("page")
                .map(|p| format!(" (page {})", p))
                .unwrap_or_default();
            println!("  -{} {}", page, source.excerpt.replace('\n', " "));
        }
        println!();
    }
    if result.degraded {
        println!("[degraded answer: the full pipeline was unavailable]\n");
    }
}
