// LLM module

pub mod client;
pub mod translate;

pub use client::{LlmClient, LlmError, LlmProvider};
pub use translate::{to_chat_completion_messages, wrap_reply};
