//! Translation of extracted Arabic text through an OpenAI-compatible API.

use crate::chat::{ChatClient, ChatMessage, ChatRequest};
use crate::config::{TranslationConfig, OPENAI_API_KEY_ENV};
use crate::error::{EngineFailure, OcrError};
use crate::prompts::{language_name, translation_prompt, TRANSLATION_SYSTEM_PROMPT};
use tracing::info;

/// Translates Arabic text into another language.
#[derive(Debug, Clone)]
pub struct Translator {
    client: ChatClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Translator {
    pub fn new(config: &TranslationConfig) -> Result<Self, OcrError> {
        Ok(Self {
            client: ChatClient::new(
                "OpenAI",
                &config.base_url,
                config.api_key.clone(),
                OPENAI_API_KEY_ENV,
                config.timeout_secs,
            )?,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Translate `text` into the language with ISO 639-1 code
    /// `target_language`. Unknown codes translate to English.
    ///
    /// Empty (or whitespace-only) text returns `""` without a request.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, EngineFailure> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let language = language_name(target_language);
        info!("Translating {} chars to {}", text.chars().count(), language);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(TRANSLATION_SYSTEM_PROMPT),
                ChatMessage::user(translation_prompt(language, text)),
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let translated = self.client.complete(&request).await?;
        Ok(translated.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_needs_no_key() {
        let t = Translator::new(&TranslationConfig::default()).unwrap();
        assert_eq!(tokio_test::block_on(t.translate("", "en")).unwrap(), "");
        assert_eq!(tokio_test::block_on(t.translate(" \n ", "fr")).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let t = Translator::new(&TranslationConfig::default()).unwrap();
        let err = t.translate("مرحبا", "en").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: OpenAI API key not found. Please set the OPENAI_API_KEY environment variable."
        );
    }
}
