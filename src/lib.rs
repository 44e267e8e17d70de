//! # edgequake-img2text
//!
//! Read the text in an image with a Vision Language Model, then hand that text
//! to a text-only model and return its answer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Input      check the path is a readable regular file
//!  ├─ 2. Encode     bytes → base64 data URL (MIME guessed from extension)
//!  ├─ 3. Transcribe vision model: "Extract all the text from this image."
//!  └─ 4. Refine     text model: the transcription is the whole user message
//! ```
//!
//! Both calls go to the same OpenAI-compatible chat-completions endpoint
//! (Groq by default) and run one after the other. If the vision call fails,
//! the text call is never sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_img2text::{extract_text, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GROQ_API_KEY
//!     let config = PipelineConfig::from_env()?;
//!     let output = extract_text("whiteboard.png", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.total_prompt_tokens(),
//!         output.stats.total_completion_tokens());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-img2text = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{api_key_from_env, PipelineConfig, PipelineConfigBuilder, API_KEY_ENV};
pub use convert::{extract_text, extract_text_from_bytes, extract_text_sync, extract_text_to_file};
pub use error::Img2TextError;
pub use output::{CallStats, ExtractionOutput, ExtractionStats};
pub use pipeline::encode::{guess_mime_type, DataUrl};
pub use pipeline::llm::ModelCall;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
