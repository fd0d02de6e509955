//! Retrieval policy wrapper over the vector index
//!
//! The retriever binds a fixed `(search_type, k)` policy at construction
//! so retrieval policy can vary per deployment without touching the
//! index. The index itself is held as an immutable snapshot behind a
//! lock: rebuilds produce a new index that is swapped in atomically, so
//! in-flight searches always see a consistent snapshot.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{RetrievalConfig, SearchType};
use crate::error::{Error, Result};
use crate::index::{SearchResult, VectorIndex};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Similarity retriever with a fixed policy
pub struct Retriever {
    /// Current index snapshot, replaced wholesale on rebuild
    index: RwLock<Arc<VectorIndex>>,
    /// Embedding provider; must be the same provider the index was built with
    embedder: Arc<dyn EmbeddingProvider>,
    /// Search strategy
    search_type: SearchType,
    /// Number of chunks retrieved per query
    k: usize,
}

impl Retriever {
    /// Create a retriever over an index snapshot.
    ///
    /// A provider whose dimensionality differs from the index is a
    /// configuration error, detected here rather than per query.
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        if !index.is_empty() && embedder.dimensions() != index.dimensions() {
            return Err(Error::config(format!(
                "embedding provider produces {} dimensions but index was built with {}",
                embedder.dimensions(),
                index.dimensions()
            )));
        }

        Ok(Self {
            index: RwLock::new(index),
            embedder,
            search_type: config.search_type,
            k: config.k,
        })
    }

    /// The retrieval count bound at construction
    pub fn k(&self) -> usize {
        self.k
    }

    /// The search strategy bound at construction
    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    /// Current index snapshot
    pub fn index(&self) -> Arc<VectorIndex> {
        Arc::clone(&self.index.read())
    }

    /// Atomically replace the index snapshot (copy-on-rebuild)
    pub fn swap_index(&self, new_index: Arc<VectorIndex>) -> Result<()> {
        if !new_index.is_empty() && self.embedder.dimensions() != new_index.dimensions() {
            return Err(Error::config(format!(
                "embedding provider produces {} dimensions but new index has {}",
                self.embedder.dimensions(),
                new_index.dimensions()
            )));
        }
        *self.index.write() = new_index;
        Ok(())
    }

    /// Retrieve the chunks most similar to a question, dropping scores
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Chunk>> {
        Ok(self
            .retrieve_scored(question)
            .await?
            .into_iter()
            .map(|r| r.entry.chunk)
            .collect())
    }

    /// Retrieve with similarity scores, for callers that shape context by
    /// similarity order
    pub async fn retrieve_scored(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed(question).await?;
        let index = self.index();

        match self.search_type {
            SearchType::Similarity => index.search(&query_vector, self.k),
        }
    }
}
