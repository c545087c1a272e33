//! Prompt construction for answer generation

pub mod prompt;

pub use prompt::{PromptBuilder, CONTEXT_SEPARATOR, SYSTEM_PERSONA};
