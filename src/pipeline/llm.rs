//! Model interaction: build chat-completion requests and call the API.
//!
//! Both calls go to the same OpenAI-compatible endpoint and differ only in the
//! body:
//!
//! * **Vision** — one user message whose content is a two-part array: the
//!   instruction text and an `image_url` part carrying the data URL.
//! * **Text** — one user message whose content is the transcription itself,
//!   passed through byte-for-byte.
//!
//! Every failure is returned to the caller straight away. There is no retry
//! loop: a failed vision call means the text call is never made.

use crate::config::PipelineConfig;
use crate::error::Img2TextError;
use crate::pipeline::encode::DataUrl;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Which of the two model calls an event or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCall {
    /// Image → transcription.
    Vision,
    /// Transcription → final answer.
    Text,
}

impl fmt::Display for ModelCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelCall::Vision => f.write_str("Vision"),
            ModelCall::Text => f.write_str("Text"),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(serialize_with = "serialize_temperature")]
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Whole temperatures go out as JSON integers (`0`, not `0.0`).
fn serialize_temperature<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && *value >= 0.0 {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f32(*value)
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: MessageContent<'a>,
}

/// A plain string or an array of typed parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

/// The text of `choices[0].message.content` plus token usage when reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

// ── Request builders ─────────────────────────────────────────────────────

/// Body for the transcription call.
pub fn vision_request<'a>(config: &'a PipelineConfig, data_url: &DataUrl) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.vision_model,
        messages: vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: &config.vision_prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url.to_string(),
                    },
                },
            ]),
        }],
        temperature: config.temperature,
        max_tokens: config.vision_max_tokens,
    }
}

/// Body for the refinement call. `transcription` becomes the whole user message.
pub fn text_request<'a>(config: &'a PipelineConfig, transcription: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.text_model,
        messages: vec![ChatMessage {
            role: "user",
            content: MessageContent::Text(transcription),
        }],
        temperature: config.temperature,
        max_tokens: config.text_max_tokens,
    }
}

/// Pull the first choice's content out of a 2xx response body.
pub fn parse_completion(call: ModelCall, body: &str) -> Result<Completion, Img2TextError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| Img2TextError::MalformedResponse {
            call,
            detail: format!("invalid JSON: {e}"),
        })?;

    let usage = parsed.usage.unwrap_or_default();
    let first = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Img2TextError::MalformedResponse {
            call,
            detail: "response has no choices".into(),
        })?;
    let content = first
        .message
        .content
        .ok_or_else(|| Img2TextError::MalformedResponse {
            call,
            detail: "choices[0].message.content is missing".into(),
        })?;

    Ok(Completion {
        content,
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
    })
}

// ── Client ───────────────────────────────────────────────────────────────

/// Thin wrapper over `reqwest::Client` bound to one [`PipelineConfig`].
pub struct ChatClient<'a> {
    http: reqwest::Client,
    config: &'a PipelineConfig,
}

impl<'a> ChatClient<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<Self, Img2TextError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Img2TextError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Ask the vision model for all text in the image.
    pub async fn transcribe(&self, data_url: &DataUrl) -> Result<Completion, Img2TextError> {
        let request = vision_request(self.config, data_url);
        self.complete(ModelCall::Vision, &request).await
    }

    /// Hand the transcription to the text model unchanged.
    pub async fn refine(&self, transcription: &str) -> Result<Completion, Img2TextError> {
        let request = text_request(self.config, transcription);
        self.complete(ModelCall::Text, &request).await
    }

    async fn complete(
        &self,
        call: ModelCall,
        request: &ChatRequest<'_>,
    ) -> Result<Completion, Img2TextError> {
        info!("{} model request → {}", call, request.model);

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|source| Img2TextError::Http { call, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| Img2TextError::Http { call, source })?;

        if !status.is_success() {
            debug!("{} model returned HTTP {}", call, status.as_u16());
            return Err(Img2TextError::UpstreamStatus {
                call,
                status: status.as_u16(),
                body,
            });
        }

        let completion = parse_completion(call, &body)?;
        debug!(
            "{} model: {} input tokens, {} output tokens",
            call, completion.prompt_tokens, completion.completion_tokens
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> PipelineConfig {
        PipelineConfig::builder("k").build().unwrap()
    }

    #[test]
    fn vision_request_shape() {
        let config = config();
        let url = DataUrl::from_bytes(b"hi", "image/png");
        let body = serde_json::to_value(vision_request(&config, &url)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "llama-3.2-11b-vision-preview",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Extract all the text from this image."},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,aGk="}}
                    ]
                }],
                "temperature": 0,
                "max_tokens": 7000
            })
        );
    }

    #[test]
    fn text_request_passes_transcription_verbatim() {
        let config = config();
        let transcription = "  line one\nline \"two\"\t";
        let body = serde_json::to_value(text_request(&config, transcription)).unwrap();

        assert_eq!(body["model"], "qwen-qwq-32b");
        assert_eq!(body["max_tokens"], 6000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], transcription);
        assert_eq!(body["temperature"], json!(0));
    }

    #[test]
    fn whole_temperature_serialises_as_integer() {
        let config = PipelineConfig::builder("k").temperature(1.0).build().unwrap();
        let text = serde_json::to_string(&text_request(&config, "x")).unwrap();
        assert!(text.contains(r#""temperature":1,"#), "got: {text}");

        let config = PipelineConfig::builder("k").temperature(0.5).build().unwrap();
        let body = serde_json::to_value(text_request(&config, "x")).unwrap();
        assert_eq!(body["temperature"].as_f64(), Some(0.5));
    }

    #[test]
    fn parse_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"HELLO"}},{"message":{"content":"other"}}]}"#;
        let c = parse_completion(ModelCall::Vision, body).unwrap();
        assert_eq!(c.content, "HELLO");
        assert_eq!(c.prompt_tokens, 0);
    }

    #[test]
    fn parse_usage_when_present() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"x"}}],
                       "usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}"#;
        let c = parse_completion(ModelCall::Text, body).unwrap();
        assert_eq!((c.prompt_tokens, c.completion_tokens), (12, 3));
    }

    #[test]
    fn parse_empty_choices_is_malformed() {
        let err = parse_completion(ModelCall::Text, r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            Img2TextError::MalformedResponse {
                call: ModelCall::Text,
                ..
            }
        ));
    }

    #[test]
    fn parse_null_content_is_malformed() {
        let err =
            parse_completion(ModelCall::Vision, r#"{"choices":[{"message":{"content":null}}]}"#)
                .unwrap_err();
        assert!(err.to_string().contains("content is missing"));
    }

    #[test]
    fn parse_non_json_is_malformed() {
        let err = parse_completion(ModelCall::Vision, "<html>").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn model_call_display() {
        assert_eq!(ModelCall::Vision.to_string(), "Vision");
        assert_eq!(ModelCall::Text.to_string(), "Text");
    }
}
