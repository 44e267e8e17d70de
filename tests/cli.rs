//! Binary-level tests for `img2text`: stdout, stderr and exit status.
//!
//! The binary runs as a child process pointed at a wiremock server via
//! `--endpoint`, so nothing here touches the real API.

use serde_json::{json, Value};
use std::io::Write;
use std::process::Output;
use tempfile::NamedTempFile;
use tokio::process::Command;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

const CHAT_PATH: &str = "/openai/v1/chat/completions";

fn completion(content: &str) -> Value {
    json!({"choices": [{"message": {"content": content}}]})
}

async fn mount(server: &MockServer, model: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_partial_json(json!({ "model": model })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_hello_world(server: &MockServer, calls: u64) {
    mount(
        server,
        "llama-3.2-11b-vision-preview",
        ResponseTemplate::new(200).set_body_json(completion("HELLO")),
        calls,
    )
    .await;
    mount(
        server,
        "qwen-qwq-32b",
        ResponseTemplate::new(200).set_body_json(completion("Hello, World!")),
        calls,
    )
    .await;
}

fn image() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("tempfile");
    file.write_all(b"\x89PNG\r\n\x1a\nfake").expect("write image");
    file
}

/// Run the binary with a clean environment for the variables it reads.
async fn img2text(server: &MockServer, api_key: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_img2text"));
    for var in [
        "GROQ_API_KEY",
        "RUST_LOG",
        "IMG2TEXT_OUTPUT",
        "IMG2TEXT_ENDPOINT",
        "IMG2TEXT_VISION_MODEL",
        "IMG2TEXT_TEXT_MODEL",
        "IMG2TEXT_VISION_MAX_TOKENS",
        "IMG2TEXT_TEXT_MAX_TOKENS",
        "IMG2TEXT_TIMEOUT",
        "IMG2TEXT_JSON",
        "IMG2TEXT_VERBOSE",
        "IMG2TEXT_QUIET",
    ] {
        cmd.env_remove(var);
    }
    if let Some(key) = api_key {
        cmd.env("GROQ_API_KEY", key);
    }
    cmd.arg("--endpoint")
        .arg(format!("{}{}", server.uri(), CHAT_PATH))
        .arg("--no-progress")
        .args(args);
    cmd.output().await.expect("binary should run")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn prints_refined_text_only() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 1).await;
    let img = image();

    let out = img2text(&server, Some("test-key"), &[img.path().to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Hello, World!\n");
    assert_eq!(stderr(&out), "");
}

#[tokio::test]
async fn missing_api_key_makes_no_request() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 0).await;
    let img = image();

    let out = img2text(&server, None, &[img.path().to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(2));
    assert_eq!(stdout(&out), "");
    assert_eq!(stderr(&out), "GROQ_API_KEY environment variable is not set.\n");
}

#[tokio::test]
async fn empty_api_key_counts_as_missing() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 0).await;
    let img = image();

    let out = img2text(&server, Some(""), &[img.path().to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("not set"));
}

#[tokio::test]
async fn whitespace_api_key_is_sent_as_is() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 1).await;
    let img = image();

    let out = img2text(&server, Some(" "), &[img.path().to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Hello, World!\n");
}

#[tokio::test]
async fn missing_file_reports_error_line() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 0).await;

    let out = img2text(&server, Some("test-key"), &["/definitely/not/here.png"]).await;

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    let err = stderr(&out);
    assert!(err.starts_with("Error: "), "got: {err}");
    assert_eq!(err.lines().count(), 1, "got: {err}");
}

#[tokio::test]
async fn vision_failure_reports_status_and_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "llama-3.2-11b-vision-preview",
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
        1,
    )
    .await;
    mount(
        &server,
        "qwen-qwq-32b",
        ResponseTemplate::new(200).set_body_json(completion("unused")),
        0,
    )
    .await;
    let img = image();

    let out = img2text(&server, Some("test-key"), &[img.path().to_str().unwrap()]).await;

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert_eq!(
        stderr(&out),
        "Vision model request failed with status: 500, details: upstream exploded\n"
    );
}

#[tokio::test]
async fn repeated_runs_print_the_same_thing() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 2).await;
    let img = image();
    let arg = img.path().to_str().unwrap();

    let first = img2text(&server, Some("test-key"), &[arg]).await;
    let second = img2text(&server, Some("test-key"), &[arg]).await;

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(stdout(&first), "Hello, World!\n");
}

#[tokio::test]
async fn json_flag_prints_full_record() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 1).await;
    let img = image();

    let out = img2text(
        &server,
        Some("test-key"),
        &["--json", img.path().to_str().unwrap()],
    )
    .await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let record: Value = serde_json::from_slice(&out.stdout).expect("valid JSON on stdout");
    assert_eq!(record["text"], "Hello, World!");
    assert_eq!(record["transcription"], "HELLO");
    assert_eq!(record["stats"]["mime_type"], "image/png");
}

#[tokio::test]
async fn output_flag_writes_file_and_keeps_stdout_empty() {
    let server = MockServer::start().await;
    mount_hello_world(&server, 1).await;
    let img = image();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");

    let out = img2text(
        &server,
        Some("test-key"),
        &[
            "--quiet",
            "-o",
            target.to_str().unwrap(),
            img.path().to_str().unwrap(),
        ],
    )
    .await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "");
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "Hello, World!\n");
}

#[tokio::test]
async fn output_file_matches_stdout_byte_for_byte() {
    let server = MockServer::start().await;
    mount(
        &server,
        "llama-3.2-11b-vision-preview",
        ResponseTemplate::new(200).set_body_json(completion("HELLO")),
        2,
    )
    .await;
    mount(
        &server,
        "qwen-qwq-32b",
        ResponseTemplate::new(200).set_body_json(completion("Hello, World!\n")),
        2,
    )
    .await;
    let img = image();
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.txt");

    let printed = img2text(&server, Some("test-key"), &[img.path().to_str().unwrap()]).await;
    let written = img2text(
        &server,
        Some("test-key"),
        &[
            "--quiet",
            "-o",
            target.to_str().unwrap(),
            img.path().to_str().unwrap(),
        ],
    )
    .await;

    assert_eq!(written.status.code(), Some(0), "stderr: {}", stderr(&written));
    assert_eq!(std::fs::read(&target).unwrap(), printed.stdout);
}
