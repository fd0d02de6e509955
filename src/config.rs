//! Configuration for the RAG core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Generation (LLM) configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval policy configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index storage and result shaping configuration
    #[serde(default)]
    pub index: IndexConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("failed to parse config file: {}", e)))?;
        Ok(config)
    }

    /// Validate configuration at startup.
    ///
    /// Configuration errors abort startup; they are never deferred to
    /// query time.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than zero"));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::config("embedding batch_size must be greater than zero"));
        }
        if self.retrieval.k == 0 {
            return Err(Error::config("retrieval k must be greater than zero"));
        }
        if let Some(env_var) = &self.llm.api_key_env {
            if std::env::var(env_var).is_err() {
                return Err(Error::config(format!(
                    "required credential {} not found in environment",
                    env_var
                )));
            }
        }
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            batch_size: 32,
        }
    }
}

/// Generation (LLM) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation. Defaults to 0.0 so repeated queries
    /// against an unchanged index give the same answer.
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Environment variable holding the provider API key, if one is
    /// required. Checked at startup, not per query.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Instruction text for rewriting a follow-up question into a
    /// standalone one. Surfaced as configuration so it can be audited
    /// against fixed transcripts.
    #[serde(default = "default_reformulate_instructions")]
    pub reformulate_instructions: String,
    /// Instruction text for grounded answer generation
    #[serde(default = "default_synthesis_instructions")]
    pub synthesis_instructions: String,
    /// Answer text used when every generation path has failed
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,
}

fn default_reformulate_instructions() -> String {
    "Given the conversation above, rewrite the final question as a standalone \
     question that can be understood without the conversation. Resolve pronouns \
     and references using only the conversation. Do not answer the question and \
     do not add information that the conversation does not contain. Return only \
     the rewritten question."
        .to_string()
}

fn default_synthesis_instructions() -> String {
    "You are a support assistant. Answer the question using ONLY the context \
     below. If the context does not contain the answer, say that the information \
     is not available in the provided document. Do not use outside knowledge and \
     do not guess. Be helpful and concise."
        .to_string()
}

fn default_fallback_answer() -> String {
    "Sorry, I could not produce an answer right now. Please try again in a moment."
        .to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 2,
            api_key_env: None,
            reformulate_instructions: default_reformulate_instructions(),
            synthesis_instructions: default_synthesis_instructions(),
            fallback_answer: default_fallback_answer(),
        }
    }
}

/// Search strategy used by the retriever
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Cosine similarity over the full index
    #[default]
    Similarity,
}

/// Retrieval policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub k: usize,
    /// Search strategy
    #[serde(default)]
    pub search_type: SearchType,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 6,
            search_type: SearchType::Similarity,
        }
    }
}

/// Index storage and result shaping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory the index is saved to and loaded from
    pub storage_path: PathBuf,
    /// Maximum characters of retrieved context passed to the generator.
    /// Chunks beyond this budget are dropped from the tail (lowest
    /// similarity first).
    pub max_context_chars: usize,
    /// Characters kept per source excerpt in query results
    pub source_preview_chars: usize,
    /// Maximum number of source excerpts returned per query. The full
    /// retrieved count is still reported in `source_count`.
    pub max_source_previews: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("support-rag")
            .join("index");

        Self {
            storage_path,
            max_context_chars: 8000,
            source_preview_chars: 240,
            max_source_previews: 3,
        }
    }
}
