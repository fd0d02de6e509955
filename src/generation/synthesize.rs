//! Grounded answer synthesis from retrieved context

use std::sync::Arc;

use crate::config::{IndexConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::GenerationProvider;
use crate::types::Chunk;

/// Generates answers grounded in retrieved context
pub struct AnswerSynthesizer {
    generator: Arc<dyn GenerationProvider>,
    /// Grounding instruction text, from configuration
    instructions: String,
    /// Context budget in characters
    max_context_chars: usize,
}

impl AnswerSynthesizer {
    /// Create a new synthesizer
    pub fn new(
        generator: Arc<dyn GenerationProvider>,
        llm: &LlmConfig,
        index: &IndexConfig,
    ) -> Self {
        Self {
            generator,
            instructions: llm.synthesis_instructions.clone(),
            max_context_chars: index.max_context_chars,
        }
    }

    /// The instruction text in use, for auditing
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Generate a grounded answer for `question` from `context`.
    ///
    /// Context chunks are concatenated in retrieval order; when the block
    /// would exceed the context budget, whole chunks are dropped from the
    /// tail (lowest similarity first). At least one chunk is always kept.
    /// Provider errors propagate as [`Error::Synthesis`]; the orchestrator
    /// decides whether to fall back.
    pub async fn synthesize(&self, question: &str, context: &[Chunk]) -> Result<String> {
        let kept = self.fit_context(context);
        let context_block = PromptBuilder::build_context(kept);
        let prompt = PromptBuilder::build_answer_prompt(&self.instructions, question, &context_block);
        self.generate(&prompt).await
    }

    /// Last-resort single-shot answer with the bare QA prompt, used by the
    /// orchestrator's fallback path
    pub async fn synthesize_simple(&self, question: &str, context: &[Chunk]) -> Result<String> {
        let kept = self.fit_context(context);
        let context_block = PromptBuilder::build_context(kept);
        let prompt = PromptBuilder::build_simple_prompt(question, &context_block);
        self.generate(&prompt).await
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.generator.generate(prompt).await {
            Ok(answer) => Ok(answer),
            Err(Error::Synthesis(msg)) => Err(Error::Synthesis(msg)),
            Err(other) => Err(Error::synthesis(other.to_string())),
        }
    }

    /// Keep the longest retrieval-order prefix that fits the context
    /// budget, never fewer than one chunk
    fn fit_context<'a>(&self, chunks: &'a [Chunk]) -> &'a [Chunk] {
        let mut total = 0usize;
        let mut kept = 0usize;

        for chunk in chunks {
            let len = chunk.char_len();
            if kept > 0 && total + len > self.max_context_chars {
                break;
            }
            total += len;
            kept += 1;
        }

        &chunks[..kept]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoopGenerator;

    #[async_trait]
    impl GenerationProvider for NoopGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "noop"
        }
        fn model(&self) -> &str {
            "noop"
        }
    }

    fn synthesizer(max_context_chars: usize) -> AnswerSynthesizer {
        let llm = LlmConfig::default();
        let mut index = IndexConfig::default();
        index.max_context_chars = max_context_chars;
        AnswerSynthesizer::new(Arc::new(NoopGenerator), &llm, &index)
    }

    #[test]
    fn test_context_drops_from_the_tail() {
        let synth = synthesizer(25);
        let chunks = vec![
            Chunk::from_text("best match ten"), // 14 chars
            Chunk::from_text("second ten"),     // 10 chars
            Chunk::from_text("third chunk dropped"),
        ];

        let kept = synth.fit_context(&chunks);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "best match ten");
        assert_eq!(kept[1].text, "second ten");
    }

    #[test]
    fn test_context_always_keeps_top_chunk() {
        let synth = synthesizer(5);
        let chunks = vec![Chunk::from_text("a chunk longer than the whole budget")];

        let kept = synth.fit_context(&chunks);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_context_keeps_everything_when_it_fits() {
        let synth = synthesizer(10_000);
        let chunks = vec![
            Chunk::from_text("one"),
            Chunk::from_text("two"),
            Chunk::from_text("three"),
        ];
        assert_eq!(synth.fit_context(&chunks).len(), 3);
    }
}
