use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat-completion seam: ordered messages in, one completion out.
pub trait TextGenerator: Send + Sync {
    fn chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Model name reported by status checks.
    fn model(&self) -> &str;

    fn base_url(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaChatResponse {
    /// `message.content` when non-empty, otherwise the legacy `response` field.
    fn into_text(self) -> String {
        self.message
            .map(|message| message.content)
            .filter(|content| !content.is_empty())
            .or(self.response)
            .unwrap_or_default()
    }
}

/// Client for an Ollama-compatible `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl TextGenerator for OllamaClient {
    fn chat(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        let http = self.http.clone();
        let url = self.chat_url();
        let base_url = self.base_url.clone();
        let model = self.model.clone();

        async move {
            tracing::info!(%model, messages = messages.len(), "requesting chat completion");

            let body = OllamaChatRequest {
                model: &model,
                messages: &messages,
                stream: false,
            };
            let response = http
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|source| LlmError::from_transport(&base_url, source))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let payload: OllamaChatResponse = response
                .json()
                .await
                .map_err(|source| LlmError::Decode { source })?;

            Ok(payload.into_text())
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error(
        "Cannot connect to the text-generation service at {base_url}. \
         Make sure Ollama is running (ollama serve)"
    )]
    Unavailable {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("text-generation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("text-generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("text-generation service returned an unreadable body")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
}

impl LlmError {
    fn from_transport(base_url: &str, source: reqwest::Error) -> Self {
        if source.is_connect() {
            Self::Unavailable {
                base_url: base_url.to_string(),
                source,
            }
        } else {
            Self::Transport(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_roles_lowercase() {
        let value = serde_json::to_value(ChatMessage::assistant("hi")).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({ "role": "assistant", "content": "hi" })
        );
    }

    #[test]
    fn completion_text_falls_back_to_response_field() {
        let chat: OllamaChatResponse = serde_json::from_value(serde_json::json!({
            "message": { "role": "assistant", "content": "from message" },
            "response": "from response"
        }))
        .expect("parses");
        assert_eq!(chat.into_text(), "from message");

        let legacy: OllamaChatResponse =
            serde_json::from_value(serde_json::json!({ "response": "legacy" })).expect("parses");
        assert_eq!(legacy.into_text(), "legacy");

        let empty: OllamaChatResponse =
            serde_json::from_value(serde_json::json!({ "message": { "content": "" } }))
                .expect("parses");
        assert_eq!(empty.into_text(), "");
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = OllamaClient::new(&LlmConfig {
            base_url: "http://localhost:11434/".to_string(),
            model: "llama3".to_string(),
        });
        assert_eq!(client.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(client.model(), "llama3");
    }
}
