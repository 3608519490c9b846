//! Minimal client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Both the Mistral OCR engine and the translator speak this protocol, so
//! they share one client type that differs only in base URL, key and the
//! service name used in failure messages.

use crate::error::{EngineFailure, OcrError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying an instruction followed by an image.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client bound to one service.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    service: String,
    endpoint: String,
    api_key: Option<String>,
    key_env_var: &'static str,
    timeout_secs: u64,
}

impl ChatClient {
    /// `service` names the provider in failure messages ("Mistral", "OpenAI").
    pub fn new(
        service: impl Into<String>,
        base_url: &str,
        api_key: Option<String>,
        key_env_var: &'static str,
        timeout_secs: u64,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OcrError::Internal(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            service: service.into(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            key_env_var,
            timeout_secs,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn transport_failure(&self, e: reqwest::Error) -> EngineFailure {
        if e.is_timeout() {
            EngineFailure::Timeout {
                service: self.service.clone(),
                secs: self.timeout_secs,
            }
        } else {
            EngineFailure::Transport {
                service: self.service.clone(),
                detail: e.to_string(),
            }
        }
    }

    /// Send `request` and return the first choice's message content.
    pub async fn complete(&self, request: &ChatRequest) -> Result<String, EngineFailure> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(EngineFailure::MissingCredential {
                service: self.service.clone(),
                env_var: self.key_env_var,
            });
        };

        debug!("POST {} (model={})", self.endpoint, request.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(e))?;

        if !status.is_success() {
            return Err(EngineFailure::Api {
                service: self.service.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| EngineFailure::MalformedResponse {
                service: self.service.clone(),
                detail: e.to_string(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| EngineFailure::MalformedResponse {
                service: self.service.clone(),
                detail: "response contained no choices".to_string(),
            })
    }
}
