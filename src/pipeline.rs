//! Pipeline orchestration: one request/response cycle with fallback
//! handling
//!
//! Each query walks an explicit state machine so the failure paths are
//! testable rather than incidental:
//!
//! ```text
//! Received -> Reformulated -> Retrieved -> Synthesized -> Complete
//!                  |              |             |
//!                  v              v             v
//!             (non-fatal)     Degraded      Degraded (simple path first)
//! ```

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{AnswerSynthesizer, QueryReformulator};
use crate::index::VectorIndex;
use crate::providers::{EmbeddingProvider, GenerationProvider};
use crate::retrieval::Retriever;
use crate::types::{Chunk, ConversationTurn, QueryResult, SourceExcerpt};

/// Per-query pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Question received from the caller
    Received,
    /// Standalone question produced (or passed through on failure)
    Reformulated,
    /// Context chunks retrieved
    Retrieved,
    /// Grounded answer generated
    Synthesized,
    /// Result packaged
    Complete,
    /// Terminal failure state; a fallback or error answer was produced
    Degraded,
}

/// Composes reformulation, retrieval, and synthesis into a single
/// query cycle.
///
/// The pipeline is stateless per query beyond the shared read-only index
/// snapshot and provider handles, so queries may run concurrently without
/// coordination. Step ordering within a query is fixed: reformulation
/// completes before retrieval, retrieval before synthesis.
pub struct RagPipeline {
    retriever: Retriever,
    reformulator: QueryReformulator,
    synthesizer: AnswerSynthesizer,
    /// Answer text used when every generation path has failed
    fallback_answer: String,
    /// Characters kept per source excerpt
    preview_chars: usize,
    /// Cap on returned source excerpts
    max_previews: usize,
}

impl RagPipeline {
    /// Assemble a pipeline from its components
    pub fn new(
        retriever: Retriever,
        reformulator: QueryReformulator,
        synthesizer: AnswerSynthesizer,
        config: &RagConfig,
    ) -> Self {
        Self {
            retriever,
            reformulator,
            synthesizer,
            fallback_answer: config.llm.fallback_answer.clone(),
            preview_chars: config.index.source_preview_chars,
            max_previews: config.index.max_source_previews,
        }
    }

    /// Assemble a pipeline from an index snapshot and provider handles
    pub fn from_providers(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        let retriever = Retriever::new(index, embedder, &config.retrieval)?;
        let reformulator = QueryReformulator::new(Arc::clone(&generator), &config.llm);
        let synthesizer = AnswerSynthesizer::new(generator, &config.llm, &config.index);
        Ok(Self::new(retriever, reformulator, synthesizer, config))
    }

    /// The retriever, for index snapshot swaps after a rebuild
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer a question, optionally conditioned on prior conversation
    /// turns.
    ///
    /// Always returns a `QueryResult`; provider failures are recovered by
    /// the fallback path and only surface as a degraded result, never as
    /// an error from this method.
    pub async fn query(&self, question: &str, history: &[ConversationTurn]) -> QueryResult {
        Self::transition(QueryState::Received);
        tracing::info!("Query: \"{}\"", question);

        // Received -> Reformulated. Reformulation failure is non-fatal:
        // the reformulator falls back to the original question internally,
        // and the state still advances.
        let standalone = self.reformulator.reformulate(history, question).await;
        Self::transition(QueryState::Reformulated);

        // Reformulated -> Retrieved
        let scored = match self.retriever.retrieve_scored(&standalone).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Retrieval failed: {}", e);
                return self.degraded_result(question);
            }
        };
        Self::transition(QueryState::Retrieved);

        let chunks: Vec<Chunk> = scored.into_iter().map(|r| r.entry.chunk).collect();

        // Retrieved -> Synthesized -> Complete
        match self.synthesizer.synthesize(&standalone, &chunks).await {
            Ok(answer) => {
                Self::transition(QueryState::Synthesized);
                let result = self.complete_result(question, answer, &chunks, false);
                Self::transition(QueryState::Complete);
                result
            }
            Err(e) => {
                tracing::warn!("Synthesis failed ({}), trying simple path", e);
                self.simple_path(question).await
            }
        }
    }

    /// Last-resort single-shot answer: direct retrieval on the original
    /// question, bypassing reformulation and the grounded prompt
    async fn simple_path(&self, question: &str) -> QueryResult {
        Self::transition(QueryState::Degraded);
        let chunks = match self.retriever.retrieve(question).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::error!("Simple path retrieval failed: {}", e);
                return self.degraded_result(question);
            }
        };

        match self.synthesizer.synthesize_simple(question, &chunks).await {
            Ok(answer) => {
                tracing::info!("Simple path answered after pipeline degradation");
                self.complete_result(question, answer, &chunks, true)
            }
            Err(e) => {
                tracing::error!("Simple path synthesis failed: {}", e);
                self.degraded_result(question)
            }
        }
    }

    /// Package a result, truncating excerpts and capping the preview
    /// count while `source_count` reports the full retrieved count
    fn complete_result(
        &self,
        question: &str,
        answer: String,
        chunks: &[Chunk],
        degraded: bool,
    ) -> QueryResult {
        let sources: Vec<SourceExcerpt> = chunks
            .iter()
            .take(self.max_previews)
            .map(|chunk| SourceExcerpt::from_chunk(chunk, self.preview_chars))
            .collect();

        tracing::info!(
            "Query complete: {} sources retrieved, {} previews returned{}",
            chunks.len(),
            sources.len(),
            if degraded { " (degraded)" } else { "" }
        );

        if degraded {
            QueryResult::degraded(question, answer, sources, chunks.len())
        } else {
            QueryResult::new(question, answer, sources, chunks.len())
        }
    }

    /// Terminal degraded outcome: explicit fallback answer, no sources
    fn degraded_result(&self, question: &str) -> QueryResult {
        Self::transition(QueryState::Degraded);
        QueryResult::degraded(question, self.fallback_answer.clone(), Vec::new(), 0)
    }

    fn transition(state: QueryState) {
        tracing::debug!(?state, "query state");
    }
}
