pub mod explain;
pub mod llm_provider;
pub mod openai_provider;

pub use explain::{explain_phrase, explanation_messages, SYSTEM_PROMPT};
pub use llm_provider::*;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
