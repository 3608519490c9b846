//! Configuration types for the OCR pipeline.
//!
//! All behaviour is controlled through [`OcrConfig`], built via its
//! [`OcrConfigBuilder`]. Every knob lives in one struct so a config can be
//! shared across requests and logged (API keys are redacted in `Debug`).

use crate::error::OcrError;
use crate::pipeline::validate::MAX_UPLOAD_BYTES;
use crate::progress::ProgressCallback;
use crate::prompts::DEFAULT_OCR_PROMPT;
use std::fmt;
use std::path::PathBuf;

/// Text returned by the offline Qari recogniser until a real model is wired in.
pub const DEFAULT_LOCAL_TEXT: &str = "[Qari-OCR placeholder: This would contain the actual OCR result from Qari-OCR]\n\n\
لقد تم استخراج هذا النص باستخدام تقنية التعرف الضوئي على الحروف العربية.";

/// Environment variable holding the Mistral API key.
pub const MISTRAL_API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Environment variable holding the OpenAI API key used for translation.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable pointing at an existing libpdfium (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the workspace root.
pub const WORKSPACE_DIR_ENV: &str = "ARABIC_OCR_WORKSPACE_DIR";

/// Settings for the remote vision engine (Mistral chat completions).
#[derive(Clone)]
pub struct RemoteEngineConfig {
    /// Bearer token. `None` makes every call fail with a missing-key message.
    pub api_key: Option<String>,
    /// API base URL; `/chat/completions` is appended. Default: `https://api.mistral.ai/v1`.
    pub base_url: String,
    /// Model identifier. Default: `mistral-large-latest`.
    pub model: String,
    /// Instruction sent with every page image.
    pub prompt: String,
    /// Per-request timeout in seconds. Default: 60.
    ///
    /// A hung connection would otherwise stall the whole request, because the
    /// workspace is only released once every engine call has returned.
    pub timeout_secs: u64,
    /// Apply [`crate::pipeline::postprocess::clean_ocr_text`] to the model output. Default: true.
    pub clean_output: bool,
}

impl Default for RemoteEngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.mistral.ai/v1".to_string(),
            model: "mistral-large-latest".to_string(),
            prompt: DEFAULT_OCR_PROMPT.to_string(),
            timeout_secs: 60,
            clean_output: true,
        }
    }
}

impl fmt::Debug for RemoteEngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEngineConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("clean_output", &self.clean_output)
            .finish()
    }
}

/// Settings for the translation collaborator (OpenAI chat completions).
#[derive(Clone)]
pub struct TranslationConfig {
    pub api_key: Option<String>,
    /// Default: `https://api.openai.com/v1`.
    pub base_url: String,
    /// Default: `gpt-4o`.
    pub model: String,
    /// Default: 0.3. Low values keep translations consistent between runs.
    pub temperature: f32,
    /// Default: 4000.
    pub max_tokens: u32,
    /// Default: 60.
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 4000,
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Configuration for the OCR pipeline.
///
/// Built via [`OcrConfig::builder()`] or using [`OcrConfig::default()`].
///
/// # Example
/// ```rust
/// use arabic_ocr::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .concurrency(8)
///     .mistral_api_key("sk-test")
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Directory under which per-request workspaces are created.
    /// Default: `<system temp>/arabic-ocr`.
    pub workspace_root: PathBuf,

    /// Largest accepted upload, in bytes. Default: 10 MiB.
    pub max_upload_bytes: u64,

    /// Maximum number of engine calls in flight for one request. Default: 4.
    pub concurrency: usize,

    /// Longest edge of a rasterised PDF page, in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// User password for encrypted PDFs.
    pub password: Option<String>,

    /// Existing libpdfium (file or directory). `None` binds the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Text produced by the offline Qari recogniser.
    pub local_text: String,

    /// Remote (Mistral) engine settings.
    pub mistral: RemoteEngineConfig,

    /// Translation collaborator settings.
    pub translation: TranslationConfig,

    /// Optional per-engine progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("arabic-ocr"),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            concurrency: 4,
            max_rendered_pixels: 2000,
            password: None,
            pdfium_library_path: None,
            local_text: DEFAULT_LOCAL_TEXT.to_string(),
            mistral: RemoteEngineConfig::default(),
            translation: TranslationConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("workspace_root", &self.workspace_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("concurrency", &self.concurrency)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("mistral", &self.mistral)
            .field("translation", &self.translation)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn OcrProgressCallback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults plus API keys and paths taken from the environment.
    pub fn from_env() -> Result<Self, OcrError> {
        Self::builder().with_env().build()
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

/// Read a non-empty environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl OcrConfigBuilder {
    /// Fill API keys and paths from `MISTRAL_API_KEY`, `OPENAI_API_KEY`,
    /// `PDFIUM_LIB_PATH` and `ARABIC_OCR_WORKSPACE_DIR`. Unset or empty
    /// variables leave the current value alone.
    pub fn with_env(mut self) -> Self {
        if let Some(key) = env_value(MISTRAL_API_KEY_ENV) {
            self.config.mistral.api_key = Some(key);
        }
        if let Some(key) = env_value(OPENAI_API_KEY_ENV) {
            self.config.translation.api_key = Some(key);
        }
        if let Some(path) = env_value(PDFIUM_LIB_PATH_ENV) {
            self.config.pdfium_library_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = env_value(WORKSPACE_DIR_ENV) {
            self.config.workspace_root = PathBuf::from(dir);
        }
        self
    }

    pub fn workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = root.into();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn local_text(mut self, text: impl Into<String>) -> Self {
        self.config.local_text = text.into();
        self
    }

    pub fn mistral_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.mistral.api_key = Some(key.into());
        self
    }

    pub fn mistral_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.mistral.base_url = url.into();
        self
    }

    pub fn mistral_model(mut self, model: impl Into<String>) -> Self {
        self.config.mistral.model = model.into();
        self
    }

    pub fn ocr_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.mistral.prompt = prompt.into();
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.mistral.clean_output = v;
        self
    }

    /// Timeout for every remote call (OCR and translation).
    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.mistral.timeout_secs = secs;
        self.config.translation.timeout_secs = secs;
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.translation.api_key = Some(key.into());
        self
    }

    pub fn translation_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.translation.base_url = url.into();
        self
    }

    pub fn translation_model(mut self, model: impl Into<String>) -> Self {
        self.config.translation.model = model.into();
        self
    }

    pub fn translation_temperature(mut self, t: f32) -> Self {
        self.config.translation.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, OcrError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(OcrError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(OcrError::InvalidConfig(
                "Maximum upload size must be > 0".into(),
            ));
        }
        if c.mistral.timeout_secs == 0 || c.translation.timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        for url in [&c.mistral.base_url, &c.translation.base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(OcrError::InvalidConfig(format!(
                    "Base URL must start with http:// or https://, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}
