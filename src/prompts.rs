//! Fixed instructions sent to the remote models.
//!
//! Callers can override the OCR instruction via
//! [`crate::config::RemoteEngineConfig::prompt`]; the translation prompts are
//! built here from the target language.

/// Instruction sent with every page image to the remote vision model.
pub const DEFAULT_OCR_PROMPT: &str = "Extract all Arabic text from this image. \
Return only the extracted text without any additional comments or explanations.";

/// System message for translation requests.
pub const TRANSLATION_SYSTEM_PROMPT: &str =
    "You are a professional translator specializing in Arabic to other languages.";

/// Build the user message for translating `text` into `language_name`.
pub fn translation_prompt(language_name: &str, text: &str) -> String {
    format!(
        "Translate the following Arabic text to {language_name}. \
Provide only the translation without any additional text or explanations:\n\n{text}"
    )
}

/// Map an ISO 639-1 code to the language name used in the prompt.
///
/// Unknown codes fall back to English.
pub fn language_name(code: &str) -> &'static str {
    match code.trim().to_ascii_lowercase().as_str() {
        "en" => "English",
        "fr" => "French",
        "es" => "Spanish",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "zh" => "Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ar" => "Arabic",
        _ => "English",
    }
}
