//! Vector index over embedded chunks
//!
//! The index is built in bulk from a batch of chunks and is immutable
//! afterwards; rebuilds produce a new index that replaces the old snapshot
//! (see [`crate::retrieval::Retriever::swap_index`]). Search is exact
//! cosine similarity over all entries, deterministic with stable
//! insertion-order tie-breaking.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, EmbeddedChunk};

/// On-disk payload filename
const INDEX_FILE: &str = "index.json";
/// Sidecar checksum filename
const CHECKSUM_FILE: &str = "index.json.sha256";
/// Persistence format version
const FORMAT_VERSION: u32 = 1;

/// A chunk matched by a similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched entry
    pub entry: EmbeddedChunk,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

/// Serialized index payload
#[derive(Serialize, Deserialize)]
struct IndexPayload {
    version: u32,
    dimensions: usize,
    entries: Vec<EmbeddedChunk>,
}

/// Searchable structure over embedded chunks
#[derive(Debug, Clone)]
pub struct VectorIndex {
    /// Fixed vector dimensionality for every entry
    dimensions: usize,
    /// Entries in insertion order
    entries: Vec<EmbeddedChunk>,
}

impl VectorIndex {
    /// Build an index by embedding every chunk.
    ///
    /// Provider calls are batched; the build is deterministic given
    /// identical chunks and provider state. This is the only way entries
    /// get into an index — there is no online insert.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        let dimensions = provider.dimensions();
        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = provider.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "provider returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                if vector.len() != dimensions {
                    return Err(Error::embedding(format!(
                        "provider returned {} dimensions, expected {}",
                        vector.len(),
                        dimensions
                    )));
                }
                entries.push(EmbeddedChunk {
                    vector,
                    chunk: chunk.clone(),
                });
            }
        }

        tracing::info!("Built index with {} chunks ({} dims)", entries.len(), dimensions);

        Ok(Self {
            dimensions,
            entries,
        })
    }

    /// Vector dimensionality of this index
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search for the `k` entries closest to `query_vector`.
    ///
    /// Results are ordered by descending similarity with ties broken by
    /// insertion order. `k` larger than the index returns every entry;
    /// an empty index returns an empty vec.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_vector.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "query vector has {} dimensions, index has {}",
                query_vector.len(),
                self.dimensions
            )));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                entry: entry.clone(),
                similarity: cosine_similarity(query_vector, &entry.vector),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    /// Persist the index to a directory as a JSON payload plus a sha256
    /// checksum sidecar.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let payload = IndexPayload {
            version: FORMAT_VERSION,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };
        let serialized = serde_json::to_string(&payload)?;
        let checksum = hex::encode(Sha256::digest(serialized.as_bytes()));

        std::fs::write(dir.join(INDEX_FILE), &serialized)?;
        std::fs::write(dir.join(CHECKSUM_FILE), &checksum)?;

        tracing::info!("Saved index ({} chunks) to {}", self.entries.len(), dir.display());
        Ok(())
    }

    /// Load a previously saved index.
    ///
    /// The payload is only trusted if its checksum matches the sidecar
    /// written at save time; a missing, tampered, or version-incompatible
    /// payload fails closed with [`Error::CorruptIndex`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let serialized = std::fs::read_to_string(dir.join(INDEX_FILE))
            .map_err(|e| Error::corrupt_index(format!("cannot read index payload: {}", e)))?;
        let expected = std::fs::read_to_string(dir.join(CHECKSUM_FILE))
            .map_err(|e| Error::corrupt_index(format!("cannot read index checksum: {}", e)))?;

        let actual = hex::encode(Sha256::digest(serialized.as_bytes()));
        if actual != expected.trim() {
            return Err(Error::corrupt_index(
                "checksum mismatch, index was corrupted or tampered with",
            ));
        }

        let payload: IndexPayload = serde_json::from_str(&serialized)
            .map_err(|e| Error::corrupt_index(format!("malformed index payload: {}", e)))?;

        if payload.version != FORMAT_VERSION {
            return Err(Error::corrupt_index(format!(
                "unsupported index format version {}",
                payload.version
            )));
        }
        for (i, entry) in payload.entries.iter().enumerate() {
            if entry.vector.len() != payload.dimensions {
                return Err(Error::corrupt_index(format!(
                    "entry {} has {} dimensions, index declares {}",
                    i,
                    entry.vector.len(),
                    payload.dimensions
                )));
            }
        }

        tracing::info!(
            "Loaded index ({} chunks) from {}",
            payload.entries.len(),
            dir.display()
        );

        Ok(Self {
            dimensions: payload.dimensions,
            entries: payload.entries,
        })
    }

    /// Check whether a directory holds a saved index
    pub fn exists(dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        dir.join(INDEX_FILE).is_file() && dir.join(CHECKSUM_FILE).is_file()
    }

    #[cfg(test)]
    pub(crate) fn from_entries(dimensions: usize, entries: Vec<EmbeddedChunk>) -> Self {
        Self {
            dimensions,
            entries,
        }
    }
}

/// Cosine similarity between two vectors of equal length
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(vector: Vec<f32>, text: &str) -> EmbeddedChunk {
        EmbeddedChunk {
            vector,
            chunk: Chunk::from_text(text),
        }
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::from_entries(
            2,
            vec![
                entry(vec![1.0, 0.0], "east"),
                entry(vec![0.0, 1.0], "north"),
                entry(vec![0.7, 0.7], "northeast"),
            ],
        )
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.0], 3).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.chunk.text, "east");
        assert_eq!(results[1].entry.chunk.text, "northeast");
        assert_eq!(results[2].entry.chunk.text, "north");
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        let index = sample_index();
        let results = index.search(&[0.0, 1.0], 50).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = VectorIndex::from_entries(2, Vec::new());
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let index = VectorIndex::from_entries(
            2,
            vec![
                entry(vec![1.0, 0.0], "first"),
                entry(vec![2.0, 0.0], "second"), // same direction, same cosine
                entry(vec![0.0, 1.0], "other"),
            ],
        );
        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].entry.chunk.text, "first");
        assert_eq!(results[1].entry.chunk.text, "second");
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 2),
            Err(Error::Embedding(_))
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        index.save(dir.path()).unwrap();

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), index.len());
        assert_eq!(loaded.dimensions(), index.dimensions());

        let probe = [0.6, 0.8];
        let before = index.search(&probe, 3).unwrap();
        let after = loaded.search(&probe, 3).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.entry.chunk, b.entry.chunk);
            assert!((a.similarity - b.similarity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tampered_payload_fails_closed() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        index.save(dir.path()).unwrap();

        let payload_path = dir.path().join(INDEX_FILE);
        let mut payload = std::fs::read_to_string(&payload_path).unwrap();
        payload = payload.replace("east", "west");
        std::fs::write(&payload_path, payload).unwrap();

        assert!(matches!(
            VectorIndex::load(dir.path()),
            Err(Error::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_missing_checksum_fails_closed() {
        let index = sample_index();
        let dir = tempfile::tempdir().unwrap();
        index.save(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(CHECKSUM_FILE)).unwrap();

        assert!(matches!(
            VectorIndex::load(dir.path()),
            Err(Error::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_garbage_payload_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = "{\"not\": \"an index\"}";
        std::fs::write(dir.path().join(INDEX_FILE), garbage).unwrap();
        std::fs::write(
            dir.path().join(CHECKSUM_FILE),
            hex::encode(Sha256::digest(garbage.as_bytes())),
        )
        .unwrap();

        assert!(matches!(
            VectorIndex::load(dir.path()),
            Err(Error::CorruptIndex(_))
        ));
    }
}
