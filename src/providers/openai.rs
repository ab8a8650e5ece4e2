use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;

use super::{CallPath, CompletionBackend, CompletionFuture};
use crate::prompt::Prompt;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const SAMPLING_TEMPERATURE: f64 = 0.2;
const FALLBACK_MAX_OUTPUT_TOKENS: u32 = 800;

#[derive(Debug, Clone)]
pub struct OpenAI {
    key: Option<String>,
    model: String,
}

impl OpenAI {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    fn key(&self) -> Result<&str> {
        self.key
            .as_deref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))
    }
}

impl CompletionBackend for OpenAI {
    fn complete(&self, path: CallPath, prompt: Prompt) -> CompletionFuture {
        let provider = self.clone();
        Box::pin(async move {
            match path {
                CallPath::StructuredJson => call_chat_completions(provider, prompt).await,
                CallPath::PlainText => call_responses(provider, prompt).await,
            }
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn base_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

async fn call_chat_completions(provider: OpenAI, prompt: Prompt) -> Result<String> {
    let client = reqwest::Client::new();
    let url = format!("{}/chat/completions", base_url());
    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "system", "content": prompt.system},
            {"role": "user", "content": prompt.user}
        ],
        "response_format": {"type": "json_object"},
        "temperature": SAMPLING_TEMPERATURE
    });

    let response = client
        .post(&url)
        .bearer_auth(provider.key()?)
        .json(&body)
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(anyhow!(
            "OpenAI API error ({}): {}",
            status,
            extract_openai_error(&text).unwrap_or(text)
        ));
    }
    extract_chat_content(&text)
}

async fn call_responses(provider: OpenAI, prompt: Prompt) -> Result<String> {
    let client = reqwest::Client::new();
    let url = format!("{}/responses", base_url());
    let body = json!({
        "model": provider.model,
        "input": [
            {"role": "system", "content": prompt.system},
            {"role": "user", "content": prompt.user}
        ],
        "temperature": SAMPLING_TEMPERATURE,
        "max_output_tokens": FALLBACK_MAX_OUTPUT_TOKENS
    });

    let response = client
        .post(&url)
        .bearer_auth(provider.key()?)
        .json(&body)
        .send()
        .await?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(anyhow!(
            "OpenAI API error ({}): {}",
            status,
            extract_openai_error(&text).unwrap_or(text)
        ));
    }
    extract_output_text(&text)
}

fn extract_chat_content(text: &str) -> Result<String> {
    let payload: ChatResponse =
        serde_json::from_str(text).with_context(|| "failed to parse OpenAI chat response JSON")?;
    Ok(payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_else(|| "{}".to_string()))
}

/// Text extractors for the responses API, tried in order; the first one
/// producing a non-empty string wins. Different service versions populate
/// different fields.
const TEXT_EXTRACTORS: &[fn(&ResponsesPayload) -> Option<String>] = &[
    top_level_output_text,
    typed_output_text,
    first_content_text,
];

fn extract_output_text(text: &str) -> Result<String> {
    let payload: ResponsesPayload =
        serde_json::from_str(text).with_context(|| "failed to parse OpenAI responses JSON")?;
    Ok(TEXT_EXTRACTORS
        .iter()
        .find_map(|extract| extract(&payload))
        .unwrap_or_default())
}

fn top_level_output_text(payload: &ResponsesPayload) -> Option<String> {
    payload
        .output_text
        .clone()
        .filter(|value| !value.is_empty())
}

fn typed_output_text(payload: &ResponsesPayload) -> Option<String> {
    payload
        .output
        .first()?
        .content
        .iter()
        .find(|part| part.kind.as_deref() == Some("output_text"))?
        .text
        .clone()
        .filter(|value| !value.is_empty())
}

fn first_content_text(payload: &ResponsesPayload) -> Option<String> {
    payload
        .output
        .first()?
        .content
        .first()?
        .text
        .clone()
        .filter(|value| !value.is_empty())
}

fn extract_openai_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<OpenAIError>,
    }

    #[derive(Deserialize)]
    struct OpenAIError {
        message: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        code: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message.filter(|value| !value.trim().is_empty()) {
        parts.push(message);
    }
    if let Some(kind) = error.kind.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("type: {}", kind));
    }
    if let Some(code) = error.code.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("code: {}", code));
    }
    if parts.is_empty() {
        Some("unknown error".to_string())
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesPayload {
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
}

#[derive(Debug, Deserialize)]
struct ResponsesOutputItem {
    #[serde(default)]
    content: Vec<ResponsesContentPart>,
}

#[derive(Debug, Deserialize)]
struct ResponsesContentPart {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}
