//! Top-level extraction entry points.
//!
//! [`extract_text`] runs the whole pipeline: resolve → encode → transcribe →
//! refine. The other functions are thin variants for in-memory input, file
//! output and non-async callers.

use crate::config::PipelineConfig;
use crate::error::Img2TextError;
use crate::output::{CallStats, ExtractionOutput, ExtractionStats};
use crate::pipeline::encode::{self, DataUrl};
use crate::pipeline::input;
use crate::pipeline::llm::{ChatClient, Completion, ModelCall};
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Extract the text of an image and refine it with the text model.
///
/// # Arguments
/// * `path`   — local image file
/// * `config` — endpoint, credential, models and bounds
///
/// # Returns
/// The refined text, the intermediate transcription and per-call stats.
///
/// # Errors
/// Any failure stops the pipeline. If the vision call fails the text call is
/// never sent.
///
/// # Example
/// ```rust,no_run
/// use edgequake_img2text::{extract_text, PipelineConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::from_env()?;
/// let output = extract_text("receipt.jpg", &config).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_text(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<ExtractionOutput, Img2TextError> {
    let start = Instant::now();
    let path = input::resolve_image(path)?;
    let (data_url, image_bytes) = encode::encode_image(&path).await?;
    run(data_url, image_bytes, config, start).await
}

/// Same as [`extract_text`] for image bytes already in memory.
///
/// `mime_type` goes into the data URL unchanged; use
/// [`crate::pipeline::encode::guess_mime_type`] if all you have is a file name.
pub async fn extract_text_from_bytes(
    bytes: &[u8],
    mime_type: &str,
    config: &PipelineConfig,
) -> Result<ExtractionOutput, Img2TextError> {
    let start = Instant::now();
    let data_url = DataUrl::from_bytes(bytes, mime_type);
    run(data_url, bytes.len(), config, start).await
}

/// Run the pipeline and write the refined text to `output_path`.
///
/// The file holds exactly what stdout would: the text followed by one `\n`.
/// It is written to a sibling `.tmp` file first and then renamed. The `.tmp`
/// file is removed again if either step fails.
pub async fn extract_text_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<ExtractionStats, Img2TextError> {
    let output = extract_text(input_path, config).await?;
    let path = output_path.as_ref();

    let tmp_path = path.with_extension("txt.tmp");
    let mut contents = output.text;
    contents.push('\n');

    let written = match tokio::fs::write(&tmp_path, &contents).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(Img2TextError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract_text`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_text_sync(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<ExtractionOutput, Img2TextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Img2TextError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_text(path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run(
    data_url: DataUrl,
    image_bytes: usize,
    config: &PipelineConfig,
    start: Instant,
) -> Result<ExtractionOutput, Img2TextError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_encoded(&data_url.mime_type, image_bytes);
    }
    let mime_type = data_url.mime_type.clone();

    let client = ChatClient::new(config)?;

    let (vision, vision_stats) = timed_call(
        config,
        ModelCall::Vision,
        &config.vision_model,
        client.transcribe(&data_url),
    )
    .await?;
    // The data URL is no longer needed; release it before the second call.
    drop(data_url);

    let (text, text_stats) = timed_call(
        config,
        ModelCall::Text,
        &config.text_model,
        client.refine(&vision.content),
    )
    .await?;

    let stats = ExtractionStats {
        mime_type,
        image_bytes,
        vision: vision_stats,
        text: text_stats,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Extraction complete: {} chars transcribed, {} chars returned, {}ms",
        vision.content.len(),
        text.content.len(),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        text: text.content,
        transcription: vision.content,
        stats,
    })
}

/// Await one model call, reporting progress and timing it.
async fn timed_call(
    config: &PipelineConfig,
    call: ModelCall,
    model: &str,
    request: impl Future<Output = Result<Completion, Img2TextError>>,
) -> Result<(Completion, CallStats), Img2TextError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_call_start(call);
    }
    let start = Instant::now();

    match request.await {
        Ok(completion) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_call_complete(call, completion.content.len());
            }
            let stats = CallStats {
                model: model.to_string(),
                prompt_tokens: completion.prompt_tokens,
                completion_tokens: completion.completion_tokens,
                duration_ms: start.elapsed().as_millis() as u64,
            };
            Ok((completion, stats))
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_call_error(call, &e.to_string());
            }
            Err(e)
        }
    }
}
