//! Core data types shared across the pipeline

pub mod chunk;
pub mod conversation;
pub mod result;

pub use chunk::{Chunk, EmbeddedChunk};
pub use conversation::{ConversationTurn, Role};
pub use result::{QueryResult, SourceExcerpt};
