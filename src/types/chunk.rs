//! Chunk types with source metadata for excerpts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key for the 1-based page a chunk starts on
pub const META_PAGE: &str = "page";
/// Metadata key for the chunk's position in the document
pub const META_CHUNK_INDEX: &str = "chunk_index";

/// An immutable span of source text prepared for embedding.
///
/// Sizes throughout the chunking pipeline are measured in characters
/// (Unicode scalar values), not bytes or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text
    pub text: String,
    /// Source attributes (page number, chunk index, ...)
    pub metadata: BTreeMap<String, String>,
}

impl Chunk {
    /// Create a chunk with source metadata
    pub fn new(text: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Create a chunk with no metadata (mostly for tests)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Character length of the chunk text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk plus its dense vector representation.
///
/// The vector dimensionality is fixed per index instance and matches the
/// embedding provider's output size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    /// Dense embedding vector
    pub vector: Vec<f32>,
    /// The embedded chunk
    pub chunk: Chunk,
}
