//! Instruction text sent to the vision model.
//!
//! The refinement call has no prompt of its own: the transcription is the
//! entire user message, so the text model decides what to do with it (answer
//! a question in the image, solve a worksheet, tidy a receipt, …).

/// Instruction paired with the image in the transcription request.
pub const DEFAULT_VISION_PROMPT: &str = "Extract all the text from this image.";
