//! Configuration types for the image-to-text pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. The credential is part of the config and is
//! handed in explicitly; nothing below this module reads the environment.
//!
//! Defaults reproduce the fixed request bodies exactly: the Groq endpoint,
//! `llama-3.2-11b-vision-preview` for transcription, `qwen-qwq-32b` for
//! refinement, temperature 0, and 7000 / 6000 output tokens.

use crate::error::Img2TextError;
use crate::progress::ProgressCallback;
use crate::prompts::DEFAULT_VISION_PROMPT;
use std::fmt;

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// OpenAI-compatible chat-completions endpoint used by both calls.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Vision-capable model used to transcribe the image.
pub const DEFAULT_VISION_MODEL: &str = "llama-3.2-11b-vision-preview";

/// Text-only model the transcription is handed to.
pub const DEFAULT_TEXT_MODEL: &str = "qwen-qwq-32b";

pub const DEFAULT_VISION_MAX_TOKENS: u32 = 7000;
pub const DEFAULT_TEXT_MAX_TOKENS: u32 = 6000;

/// Read the API credential from [`API_KEY_ENV`].
///
/// An empty value counts as missing. Any other value, whitespace included,
/// is used as-is.
pub fn api_key_from_env() -> Result<String, Img2TextError> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(Img2TextError::MissingApiKey),
    }
}

/// Configuration for one image-to-text run.
///
/// # Example
/// ```rust
/// use edgequake_img2text::PipelineConfig;
///
/// let config = PipelineConfig::builder("gsk_test")
///     .text_model("llama-3.3-70b-versatile")
///     .text_max_tokens(2048)
///     .build()
///     .unwrap();
/// assert_eq!(config.vision_max_tokens, 7000);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Chat-completions URL shared by the vision and text calls.
    pub endpoint: String,

    /// Bearer token sent with both calls. Never printed by `Debug`.
    pub api_key: String,

    /// Model id for the transcription call.
    pub vision_model: String,

    /// Model id for the refinement call.
    pub text_model: String,

    /// Instruction sent alongside the image.
    pub vision_prompt: String,

    /// Sampling temperature for both calls. Default: 0.0.
    pub temperature: f32,

    /// `max_tokens` for the transcription call. Default: 7000.
    pub vision_max_tokens: u32,

    /// `max_tokens` for the refinement call. Default: 6000.
    pub text_max_tokens: u32,

    /// Per-request timeout. `None` leaves the HTTP client's default in place.
    pub request_timeout_secs: Option<u64>,

    /// Optional stage-level progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("vision_model", &self.vision_model)
            .field("text_model", &self.text_model)
            .field("vision_prompt", &self.vision_prompt)
            .field("temperature", &self.temperature)
            .field("vision_max_tokens", &self.vision_max_tokens)
            .field("text_max_tokens", &self.text_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder seeded with the default endpoint, models and bounds.
    pub fn builder(api_key: impl Into<String>) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                api_key: api_key.into(),
                vision_model: DEFAULT_VISION_MODEL.to_string(),
                text_model: DEFAULT_TEXT_MODEL.to_string(),
                vision_prompt: DEFAULT_VISION_PROMPT.to_string(),
                temperature: 0.0,
                vision_max_tokens: DEFAULT_VISION_MAX_TOKENS,
                text_max_tokens: DEFAULT_TEXT_MAX_TOKENS,
                request_timeout_secs: None,
                progress_callback: None,
            },
        }
    }

    /// Build a default config with the credential taken from [`API_KEY_ENV`].
    pub fn from_env() -> Result<Self, Img2TextError> {
        Self::builder(api_key_from_env()?).build()
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn vision_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.vision_prompt = prompt.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn vision_max_tokens(mut self, n: u32) -> Self {
        self.config.vision_max_tokens = n;
        self
    }

    pub fn text_max_tokens(mut self, n: u32) -> Self {
        self.config.text_max_tokens = n;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Img2TextError> {
        let c = &self.config;
        if c.api_key.is_empty() {
            return Err(Img2TextError::MissingApiKey);
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(Img2TextError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.vision_model.is_empty() || c.text_model.is_empty() {
            return Err(Img2TextError::InvalidConfig("model identifiers must not be empty".into()));
        }
        if c.vision_max_tokens == 0 || c.text_max_tokens == 0 {
            return Err(Img2TextError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(Img2TextError::InvalidConfig("request timeout must be ≥ 1 second".into()));
        }
        Ok(self.config)
    }
}
