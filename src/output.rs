//! Result types returned by the `extract_text*` functions.

use serde::{Deserialize, Serialize};

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The text model's completion. This is what the CLI prints.
    pub text: String,
    /// The vision model's completion, exactly as it was forwarded.
    pub transcription: String,
    pub stats: ExtractionStats,
}

/// Per-run statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// MIME type embedded in the data URL.
    pub mime_type: String,
    /// Size of the raw image in bytes.
    pub image_bytes: usize,
    pub vision: CallStats,
    pub text: CallStats,
    /// Wall-clock time from encoding to the final completion.
    pub total_duration_ms: u64,
}

/// Statistics for one model call.
///
/// Token counts are `0` when the API omitted the `usage` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallStats {
    pub model: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub duration_ms: u64,
}

impl ExtractionStats {
    pub fn total_prompt_tokens(&self) -> usize {
        self.vision.prompt_tokens + self.text.prompt_tokens
    }

    pub fn total_completion_tokens(&self) -> usize {
        self.vision.completion_tokens + self.text.completion_tokens
    }
}
