//! Text-generation client and helpers for reading structured data out of its replies.

mod client;
mod extract;

pub use client::{ChatMessage, ChatRole, LlmError, OllamaClient, TextGenerator};
pub use extract::{first_json_object, parse_first_object, ExtractionError};
