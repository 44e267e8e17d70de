//! Progress-callback trait for stage-level pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to be told when
//! the image has been encoded and when each model call starts and finishes.
//! The CLI uses this to drive its spinner; library callers can forward the
//! events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use edgequake_img2text::{ModelCall, PipelineConfig, PipelineProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_call_complete(&self, call: ModelCall, content_len: usize) {
//!         eprintln!("{call} model returned {content_len} bytes");
//!     }
//! }
//!
//! let config = PipelineConfig::builder("gsk_test")
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::llm::ModelCall;
use std::sync::Arc;

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in order on the task running the
/// pipeline: `on_encoded`, then start/complete (or start/error) for the
/// vision call, then the same for the text call.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once the image has been read and base64-encoded.
    ///
    /// # Arguments
    /// * `mime_type`   — the guessed MIME type
    /// * `image_bytes` — size of the raw image
    fn on_encoded(&self, mime_type: &str, image_bytes: usize) {
        let _ = (mime_type, image_bytes);
    }

    /// Called just before a model request is sent.
    fn on_call_start(&self, call: ModelCall) {
        let _ = call;
    }

    /// Called when a model call returned a completion.
    ///
    /// # Arguments
    /// * `content_len` — byte length of the completion text
    fn on_call_complete(&self, call: ModelCall, content_len: usize) {
        let _ = (call, content_len);
    }

    /// Called when a model call failed. No further calls follow.
    fn on_call_error(&self, call: ModelCall, error: &str) {
        let _ = (call, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
