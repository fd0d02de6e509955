//! support-rag: retrieval-augmented support assistant core
//!
//! Answers natural-language support questions by retrieving relevant
//! passages from a reference document and generating a grounded answer,
//! optionally conditioned on prior conversation turns. The pipeline is
//! document chunking, vector indexing, similarity retrieval,
//! conversation-aware query reformulation, and answer synthesis with
//! graceful degradation.
//!
//! Web/admin plumbing, session handling, and query-history persistence
//! live outside this crate; it exposes a single
//! [`RagPipeline::query`](pipeline::RagPipeline::query) entry point and
//! provider traits for the embedding and generation backends.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::{RagConfig, SearchType};
pub use error::{Error, Result};
pub use index::VectorIndex;
pub use ingestion::{DocumentLoader, TextChunker, TextFileLoader};
pub use pipeline::{QueryState, RagPipeline};
pub use providers::{EmbeddingProvider, GenerationProvider};
pub use retrieval::Retriever;
pub use types::{Chunk, ConversationTurn, EmbeddedChunk, QueryResult, Role, SourceExcerpt};
