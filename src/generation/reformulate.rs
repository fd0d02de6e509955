//! Conversation-aware query reformulation

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::generation::PromptBuilder;
use crate::providers::GenerationProvider;
use crate::types::ConversationTurn;

/// Rewrites follow-up questions into standalone ones using conversation
/// history
pub struct QueryReformulator {
    generator: Arc<dyn GenerationProvider>,
    /// Instruction text, from configuration
    instructions: String,
}

impl QueryReformulator {
    /// Create a new reformulator
    pub fn new(generator: Arc<dyn GenerationProvider>, config: &LlmConfig) -> Self {
        Self {
            generator,
            instructions: config.reformulate_instructions.clone(),
        }
    }

    /// The instruction text in use, for auditing against fixed transcripts
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Produce a standalone version of `question`.
    ///
    /// An empty history returns the question unchanged without a provider
    /// call: a self-contained question must never be degraded. A provider
    /// failure also falls back to the original question rather than
    /// failing the query.
    pub async fn reformulate(&self, history: &[ConversationTurn], question: &str) -> String {
        if history.is_empty() {
            return question.to_string();
        }

        let prompt = PromptBuilder::build_reformulation_prompt(
            &self.instructions,
            history,
            question,
        );

        match self.generator.generate(&prompt).await {
            Ok(rewritten) if !rewritten.trim().is_empty() => {
                tracing::debug!("Reformulated \"{}\" -> \"{}\"", question, rewritten.trim());
                rewritten.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!("Reformulation returned empty text, keeping original question");
                question.to_string()
            }
            Err(e) => {
                tracing::warn!("Reformulation failed ({}), keeping original question", e);
                question.to_string()
            }
        }
    }
}
