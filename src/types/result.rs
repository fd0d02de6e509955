//! Query result types returned to the caller

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::chunk::Chunk;

/// A truncated source passage backing an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceExcerpt {
    /// Preview of the source chunk text
    pub excerpt: String,
    /// Source attributes copied from the chunk (page number, ...)
    pub metadata: BTreeMap<String, String>,
}

impl SourceExcerpt {
    /// Build an excerpt from a chunk, truncating to `preview_chars` characters
    pub fn from_chunk(chunk: &Chunk, preview_chars: usize) -> Self {
        let excerpt = if chunk.char_len() > preview_chars {
            let truncated: String = chunk.text.chars().take(preview_chars).collect();
            format!("{}...", truncated.trim_end())
        } else {
            chunk.text.clone()
        };

        Self {
            excerpt,
            metadata: chunk.metadata.clone(),
        }
    }
}

/// The packaged outcome of one query.
///
/// Constructed once per query and immutable afterwards. The caller (web
/// layer, CLI) decides whether to persist it; the core never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Unique result ID
    pub id: Uuid,
    /// The question as asked by the caller
    pub question: String,
    /// Generated answer, or fallback text when the pipeline degraded
    pub answer: String,
    /// Truncated source previews, capped at a configured count
    pub sources: Vec<SourceExcerpt>,
    /// Full number of chunks retrieved for this answer (may exceed
    /// `sources.len()`, which is capped for display)
    pub source_count: usize,
    /// True when the full pipeline failed and a fallback path produced
    /// the answer
    pub degraded: bool,
    /// When the answer was produced
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

impl QueryResult {
    /// Package a completed query
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<SourceExcerpt>,
        source_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            answer: answer.into(),
            sources,
            source_count,
            degraded: false,
            answered_at: chrono::Utc::now(),
        }
    }

    /// Package a degraded query outcome
    pub fn degraded(
        question: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<SourceExcerpt>,
        source_count: usize,
    ) -> Self {
        let mut result = Self::new(question, answer, sources, source_count);
        result.degraded = true;
        result
    }
}
