//! Prompt templates for reformulation and grounded answering
//!
//! The instruction text comes from configuration so deployments can audit
//! and tune it against fixed transcripts; this module only does the
//! assembly.

use crate::types::chunk::{Chunk, META_PAGE};
use crate::types::ConversationTurn;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build a numbered context block from retrieved chunks, in retrieval
    /// order
    pub fn build_context(chunks: &[Chunk]) -> String {
        let mut context = String::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let source_ref = Self::format_source_ref(chunk, i + 1);
            context.push_str(&format!(
                "[{}] {}\n{}\n\n---\n\n",
                i + 1,
                source_ref,
                chunk.text.trim()
            ));
        }

        context
    }

    /// Format a short source reference for a context block header
    fn format_source_ref(chunk: &Chunk, index: usize) -> String {
        match chunk.metadata.get(META_PAGE) {
            Some(page) => format!("Excerpt {} (page {})", index, page),
            None => format!("Excerpt {}", index),
        }
    }

    /// Build the grounded answer prompt
    pub fn build_answer_prompt(instructions: &str, question: &str, context: &str) -> String {
        format!(
            "{instructions}\n\nCONTEXT:\n{context}\nQUESTION: {question}\n\nANSWER:",
            instructions = instructions,
            context = context,
            question = question
        )
    }

    /// Build the bare question-answering prompt used on the fallback path
    pub fn build_simple_prompt(question: &str, context: &str) -> String {
        format!(
            "Answer the question using only the context below.\n\n\
             Context:\n{context}\n\nQuestion: {question}\n\nAnswer:",
            context = context,
            question = question
        )
    }

    /// Build the standalone-question reformulation prompt
    pub fn build_reformulation_prompt(
        instructions: &str,
        history: &[ConversationTurn],
        question: &str,
    ) -> String {
        let transcript: String = history
            .iter()
            .map(|turn| format!("{}: {}\n", turn.role.label(), turn.text))
            .collect();

        format!(
            "CONVERSATION:\n{transcript}\nQUESTION: {question}\n\n{instructions}",
            transcript = transcript,
            question = question,
            instructions = instructions
        )
    }
}
