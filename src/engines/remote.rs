//! The remote "Mistral" vision engine.
//!
//! Each page is sent as one chat-completions request: the OCR instruction
//! plus the page as a base64 `data:` URL.

use super::OcrEngine;
use crate::chat::{ChatClient, ChatMessage, ChatRequest};
use crate::config::{RemoteEngineConfig, MISTRAL_API_KEY_ENV};
use crate::error::{EngineFailure, OcrError};
use crate::pipeline::encode::encode_image_file;
use crate::pipeline::postprocess::clean_ocr_text;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

pub const REMOTE_ENGINE_LABEL: &str = "Mistral OCR";

#[derive(Debug, Clone)]
pub struct MistralOcrEngine {
    client: ChatClient,
    model: String,
    prompt: String,
    clean_output: bool,
}

impl MistralOcrEngine {
    pub fn new(config: &RemoteEngineConfig) -> Result<Self, OcrError> {
        Ok(Self {
            client: ChatClient::new(
                "Mistral",
                &config.base_url,
                config.api_key.clone(),
                MISTRAL_API_KEY_ENV,
                config.timeout_secs,
            )?,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            clean_output: config.clean_output,
        })
    }
}

#[async_trait]
impl OcrEngine for MistralOcrEngine {
    fn label(&self) -> &str {
        REMOTE_ENGINE_LABEL
    }

    async fn recognize(&self, image: &Path) -> Result<String, EngineFailure> {
        // A missing key must not cost a file read.
        if !self.client.has_credential() {
            return Err(EngineFailure::MissingCredential {
                service: self.client.service().to_string(),
                env_var: MISTRAL_API_KEY_ENV,
            });
        }

        let url = encode_image_file(image).await?;
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_with_image(self.prompt.clone(), url)],
            temperature: None,
            max_tokens: None,
        };

        let raw = self.client.complete(&request).await?;
        debug!("{} returned {} chars for {}", REMOTE_ENGINE_LABEL, raw.chars().count(), image.display());

        Ok(if self.clean_output {
            clean_ocr_text(&raw)
        } else {
            raw
        })
    }
}
