//! Pipeline stages for image-to-text extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm (vision) ──▶ llm (text)
//! (path)    (base64)   (transcribe)     (refine)
//! ```
//!
//! 1. [`input`]  — check the path is a readable regular file
//! 2. [`encode`] — read the bytes and wrap them in a `data:` URL
//! 3. [`llm`]    — the two chat-completion calls; the only stage with
//!    network I/O

pub mod encode;
pub mod input;
pub mod llm;
