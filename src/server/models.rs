use serde::{Deserialize, Serialize};

/// `text` stays a raw JSON value so a non-string body reaches the handler's
/// own validation (400) instead of the extractor's 422.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TranslateRequest {
    pub text: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub ok: bool,
    pub model: String,
    pub data: TranslationData,
}

/// The normalized model reply. Deserialized leniently: a bare `{}` is a
/// valid (empty) translation, unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationData {
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<TokenAnnotation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
