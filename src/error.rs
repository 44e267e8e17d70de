//! Error types for the edgequake-img2text library.
//!
//! Every failure in the pipeline is fatal: there is one image, one
//! transcription and one refinement, so there is nothing partial to keep.
//! [`Img2TextError`] is therefore the only error type, returned as
//! `Err(Img2TextError)` from the `extract_text*` functions.
//!
//! Two helpers serve the CLI reporter:
//!
//! * [`Img2TextError::diagnostic`] — the single line printed to stderr.
//! * [`Img2TextError::exit_code`] — the process exit status.

use crate::config::API_KEY_ENV;
use crate::pipeline::llm::ModelCall;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-img2text library.
#[derive(Debug, Error)]
pub enum Img2TextError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// The API credential is absent or empty.
    #[error("{} environment variable is not set.", API_KEY_ENV)]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is a directory or another non-regular entry.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// The file was opened but reading it failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The request never produced an HTTP response (DNS, TLS, connect, timeout).
    #[error("{call} model request could not be completed: {source}")]
    Http {
        call: ModelCall,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status. `body` is the raw response text.
    #[error("{call} model request failed with status: {status}, details: {body}")]
    UpstreamStatus {
        call: ModelCall,
        status: u16,
        body: String,
    },

    /// 2xx response whose JSON does not carry `choices[0].message.content`.
    #[error("{call} model returned an unexpected response: {detail}")]
    MalformedResponse { call: ModelCall, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Img2TextError {
    /// The one line the CLI writes to stderr for this error.
    ///
    /// The missing-credential and upstream-status messages stand on their
    /// own; everything else is prefixed with `Error: `.
    pub fn diagnostic(&self) -> String {
        match self {
            Img2TextError::MissingApiKey | Img2TextError::UpstreamStatus { .. } => {
                self.to_string()
            }
            other => format!("Error: {other}"),
        }
    }

    /// Process exit status: 2 for configuration problems, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Img2TextError::MissingApiKey | Img2TextError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }
}
