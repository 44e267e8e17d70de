//! CLI binary for edgequake-img2text.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, prints the refined text to stdout and reports any
//! failure as a single line on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_img2text::config::{
    DEFAULT_ENDPOINT, DEFAULT_TEXT_MAX_TOKENS, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MAX_TOKENS,
    DEFAULT_VISION_MODEL,
};
use edgequake_img2text::{
    api_key_from_env, extract_text, extract_text_to_file, Img2TextError, ModelCall,
    PipelineConfig, PipelineProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner for the three stages. indicatif hides it on its own when
/// stderr is not a terminal, so piped runs see nothing but the result.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Self::with_bar(ProgressBar::new_spinner())
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Encoding");
        bar.set_message("Reading image…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_encoded(&self, mime_type: &str, image_bytes: usize) {
        self.bar.set_message(format!(
            "{mime_type}, {}",
            dim(&format!("{image_bytes} bytes"))
        ));
    }

    fn on_call_start(&self, call: ModelCall) {
        match call {
            ModelCall::Vision => {
                self.bar.set_prefix("Transcribing");
                self.bar.set_message("vision model…");
            }
            ModelCall::Text => {
                self.bar.set_prefix("Refining");
                self.bar.set_message("text model…");
            }
        }
    }

    fn on_call_complete(&self, call: ModelCall, content_len: usize) {
        // Stays on the spinner line so nothing is left behind when it clears.
        self.bar.set_message(format!(
            "{} {} model  {}",
            green("✓"),
            call,
            dim(&format!("{content_len} chars")),
        ));
    }

    fn on_call_error(&self, _call: ModelCall, _error: &str) {
        // The reporter prints the diagnostic; just get the spinner out of the way.
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe an image and let the text model answer it
  img2text worksheet.png

  # Write the answer to a file
  img2text receipt.jpg -o receipt.txt

  # Full JSON record (transcription, answer, token usage)
  img2text --json scan.webp > scan.json

  # Different models on the same endpoint
  img2text --text-model llama-3.3-70b-versatile notes.jpg

ENVIRONMENT VARIABLES:
  GROQ_API_KEY            API key (required)
  IMG2TEXT_ENDPOINT       Override the chat-completions URL
  IMG2TEXT_VISION_MODEL   Override the vision model
  IMG2TEXT_TEXT_MODEL     Override the text model
  RUST_LOG                tracing filter, e.g. RUST_LOG=edgequake_img2text=debug

EXIT STATUS:
  0  success
  1  the pipeline failed (file, network or API error)
  2  configuration error (missing GROQ_API_KEY, invalid flags)
"#;

/// Extract text from an image with a vision model, then refine it with a text model.
#[derive(Parser, Debug)]
#[command(
    name = "img2text",
    version,
    about = "Extract text from an image with a vision model, then refine it with a text model",
    long_about = "Send an image to a hosted vision model to extract all of its text, pass that \
text verbatim to a hosted text model, and print the text model's answer. Works with any \
OpenAI-compatible chat-completions endpoint; defaults to Groq.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the image file.
    image: PathBuf,

    /// Write the refined text to this file instead of stdout.
    #[arg(short, long, env = "IMG2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Chat-completions endpoint shared by both calls.
    #[arg(long, env = "IMG2TEXT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Vision model used to transcribe the image.
    #[arg(long, env = "IMG2TEXT_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    vision_model: String,

    /// Text model the transcription is handed to.
    #[arg(long, env = "IMG2TEXT_TEXT_MODEL", default_value = DEFAULT_TEXT_MODEL)]
    text_model: String,

    /// Max output tokens for the vision call.
    #[arg(long, env = "IMG2TEXT_VISION_MAX_TOKENS", default_value_t = DEFAULT_VISION_MAX_TOKENS)]
    vision_max_tokens: u32,

    /// Max output tokens for the text call.
    #[arg(long, env = "IMG2TEXT_TEXT_MAX_TOKENS", default_value_t = DEFAULT_TEXT_MAX_TOKENS)]
    text_max_tokens: u32,

    /// Per-request timeout in seconds. Unset means the HTTP client default.
    #[arg(long, env = "IMG2TEXT_TIMEOUT")]
    timeout: Option<u64>,

    /// Output structured JSON (ExtractionOutput) instead of plain text.
    #[arg(long, env = "IMG2TEXT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "IMG2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "IMG2TEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Errors are reported by the single diagnostic line below, so library
    // logs stay quiet unless asked for.
    let filter = if cli.verbose { "debug" } else { "error" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (line, code) = match err.downcast_ref::<Img2TextError>() {
                Some(e) => (e.diagnostic(), e.exit_code()),
                None => (format!("Error: {err:#}"), 1),
            };
            eprintln!("{line}");
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // The credential is checked before the file system or network is touched.
    let api_key = api_key_from_env()?;

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let progress = show_progress.then(CliProgressCallback::new);

    let config = build_config(cli, api_key, progress.clone().map(|p| p as ProgressCallback))?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let result = extract_text_to_file(&cli.image, output_path, &config).await;
        if let Some(ref p) = progress {
            p.clear();
        }
        let stats = result?;

        if !cli.quiet {
            eprintln!(
                "{}  {}ms  →  {}",
                green("✔"),
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&stats.total_prompt_tokens().to_string()),
                dim(&stats.total_completion_tokens().to_string()),
            );
        }
        return Ok(());
    }

    let result = extract_text(&cli.image, &config).await;
    if let Some(ref p) = progress {
        p.clear();
    }
    let output = result?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        writeln!(handle, "{}", output.text).context("Failed to write to stdout")?;
    }
    handle.flush().context("Failed to write to stdout")?;

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(
    cli: &Cli,
    api_key: String,
    progress: Option<ProgressCallback>,
) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder(api_key)
        .endpoint(&cli.endpoint)
        .vision_model(&cli.vision_model)
        .text_model(&cli.text_model)
        .vision_max_tokens(cli.vision_max_tokens)
        .text_max_tokens(cli.text_max_tokens);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}
