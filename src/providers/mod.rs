use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

use crate::prompt::Prompt;

mod openai;

pub use openai::{DEFAULT_MODEL, OpenAI};

/// How the completion is requested from the external service. The request
/// handler walks `ORDERED` front to back, so the structured call is always
/// attempted before the plain-text one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPath {
    /// chat/completions constrained to a JSON object reply.
    StructuredJson,
    /// responses API without response shaping; the reply is free text.
    PlainText,
}

impl CallPath {
    pub const ORDERED: [CallPath; 2] = [CallPath::StructuredJson, CallPath::PlainText];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallPath::StructuredJson => "structured-json",
            CallPath::PlainText => "plain-text",
        }
    }
}

pub type CompletionFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// An external completion service. `complete` returns the raw reply text for
/// the requested call path; parsing it is the caller's concern.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, path: CallPath, prompt: Prompt) -> CompletionFuture;

    /// The model identifier echoed in successful responses.
    fn model(&self) -> &str;
}
