use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, LlmError, TextGenerator};

const CHECK_PROMPT: &str = "Say \"Ollama is working!\" in one sentence.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStatus {
    pub success: bool,
    pub message: String,
    pub test_response: String,
    pub model: String,
    pub base_url: String,
}

/// One-line round trip to confirm the text-generation service answers.
pub async fn check<G: TextGenerator>(generator: &G) -> Result<LlmStatus, LlmError> {
    let reply = generator.chat(vec![ChatMessage::user(CHECK_PROMPT)]).await?;
    let test_response = if reply.trim().is_empty() {
        "No response".to_string()
    } else {
        reply
    };

    Ok(LlmStatus {
        success: true,
        message: "Text-generation service is reachable".to_string(),
        test_response,
        model: generator.model().to_string(),
        base_url: generator.base_url().to_string(),
    })
}
