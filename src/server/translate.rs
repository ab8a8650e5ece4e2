use tracing::{error, warn};

use super::models::{TranslateRequest, TranslateResponse, TranslationData};
use super::state::ServerState;
use crate::dictionary::DEFAULT_MAX_HITS;
use crate::prompt::{self, Prompt};
use crate::providers::{CallPath, CompletionBackend};

#[derive(Debug)]
pub struct ServerError {
    pub status: axum::http::StatusCode,
    pub message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(err.to_string())
    }
}

pub(crate) async fn translate_request(
    state: &ServerState,
    request: TranslateRequest,
) -> Result<TranslateResponse, ServerError> {
    let text = request
        .text
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ServerError::bad_request("Provide non-empty `text` string."));
    }

    let hits = state.dictionary.collect_hits(text, DEFAULT_MAX_HITS);
    let prompt = prompt::build_prompt(text, &hits).map_err(ServerError::from)?;
    let data = run_call_paths(state.backend.as_ref(), prompt)
        .await
        .map_err(|err| {
            error!("translation failed: {:#}", err);
            ServerError::from(err)
        })?;

    Ok(TranslateResponse {
        ok: true,
        model: state.backend.model().to_string(),
        data,
    })
}

/// Walks `CallPath::ORDERED` front to back. A transport failure or a reply
/// that is not valid JSON falls through to the next path; on the last path a
/// non-JSON reply is wrapped as a bare translation with a coverage note, and
/// a transport failure is fatal.
async fn run_call_paths(
    backend: &dyn CompletionBackend,
    prompt: Prompt,
) -> anyhow::Result<TranslationData> {
    let [leading_paths @ .., last_path] = CallPath::ORDERED;

    for path in leading_paths {
        match backend.complete(path, prompt.clone()).await {
            Ok(raw) => match serde_json::from_str::<TranslationData>(&raw) {
                Ok(data) => return Ok(data),
                Err(err) => warn!("{} reply is not valid JSON: {}", path.as_str(), err),
            },
            Err(err) => warn!("{} call failed: {:#}", path.as_str(), err),
        }
    }

    let raw = backend.complete(last_path, prompt).await?;
    Ok(serde_json::from_str(&raw).unwrap_or_else(|_| TranslationData {
        translation: raw,
        coverage_note: Some("fallback: not strict JSON".to_string()),
        tokens: None,
    }))
}
