//! Question reformulation and grounded answer generation

pub mod prompt;
pub mod reformulate;
pub mod synthesize;

pub use prompt::PromptBuilder;
pub use reformulate::QueryReformulator;
pub use synthesize::AnswerSynthesizer;
