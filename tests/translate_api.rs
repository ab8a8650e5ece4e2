use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use perkladar::dictionary::{Dictionary, DictionaryEntry};
use perkladar::prompt::Prompt;
use perkladar::providers::{CallPath, CompletionBackend, CompletionFuture};
use perkladar::server::{ServerState, build_router};
use perkladar::settings::Settings;

/// Canned reply per call path, recording the last user payload it saw.
struct ScriptedBackend {
    structured: Result<String, String>,
    plain: Result<String, String>,
    seen_user_payload: Arc<Mutex<Option<String>>>,
}

impl ScriptedBackend {
    fn new(structured: Result<String, String>, plain: Result<String, String>) -> Self {
        Self {
            structured,
            plain,
            seen_user_payload: Arc::new(Mutex::new(None)),
        }
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, path: CallPath, prompt: Prompt) -> CompletionFuture {
        *self.seen_user_payload.lock().unwrap() = Some(prompt.user);
        let outcome = match path {
            CallPath::StructuredJson => self.structured.clone(),
            CallPath::PlainText => self.plain.clone(),
        };
        Box::pin(async move { outcome.map_err(|message| anyhow::anyhow!(message)) })
    }

    fn model(&self) -> &str {
        "test-model"
    }
}

fn test_state(dictionary: Dictionary, backend: Arc<dyn CompletionBackend>) -> ServerState {
    ServerState {
        settings: Settings {
            api_key: None,
            model: "test-model".to_string(),
            port: 0,
            dictionary_path: PathBuf::from("slovnik.json"),
            static_root: PathBuf::from("public"),
        },
        dictionary: Arc::new(dictionary),
        backend,
    }
}

fn demo_dictionary() -> Dictionary {
    Dictionary::from_entries(vec![
        DictionaryEntry {
            pl: "dom".to_string(),
            sl: "domъ".to_string(),
            tag: Some("n".to_string()),
        },
        DictionaryEntry {
            pl: "kot ma".to_string(),
            sl: "x".to_string(),
            tag: None,
        },
    ])
}

fn translate_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_is_ok_even_without_dictionary() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("unused".to_string()),
        Err("unused".to_string()),
    ));
    let app = build_router(test_state(Dictionary::default(), backend));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn missing_text_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("must not be called".to_string()),
        Err("must not be called".to_string()),
    ));
    let payloads = Arc::clone(&backend.seen_user_payload);
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app.oneshot(translate_post("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("non-empty"));
    assert!(payloads.lock().unwrap().is_none(), "no external call");
}

#[tokio::test]
async fn non_string_text_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("must not be called".to_string()),
        Err("must not be called".to_string()),
    ));
    let payloads = Arc::clone(&backend.seen_user_payload);
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app.oneshot(translate_post(r#"{"text":42}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("non-empty"));
    assert!(payloads.lock().unwrap().is_none(), "no external call");
}

#[tokio::test]
async fn whitespace_only_text_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("must not be called".to_string()),
        Err("must not be called".to_string()),
    ));
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app
        .oneshot(translate_post(r#"{"text":"   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dictionary_hits_reach_the_model_payload() {
    let backend = Arc::new(ScriptedBackend::new(
        Ok(r#"{"translation":"domъ jestъ velikъ"}"#.to_string()),
        Err("unused".to_string()),
    ));
    let payloads = Arc::clone(&backend.seen_user_payload);
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app
        .oneshot(translate_post(r#"{"text":"Dom jest duży"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["data"]["translation"], "domъ jestъ velikъ");

    let payload = payloads.lock().unwrap().clone().unwrap();
    let payload: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(payload["text"], "Dom jest duży");
    assert_eq!(payload["dictionary_hits"][0]["pl"], "dom");
    assert_eq!(payload["dictionary_hits"][0]["sl"], "domъ");
}

#[tokio::test]
async fn primary_failure_still_yields_success_via_fallback() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("primary down".to_string()),
        Ok("domъ jestъ velikъ".to_string()),
    ));
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app
        .oneshot(translate_post(r#"{"text":"Dom jest duży"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["translation"], "domъ jestъ velikъ");
    assert_eq!(body["data"]["coverage_note"], "fallback: not strict JSON");
}

#[tokio::test]
async fn failure_of_both_paths_is_an_internal_error() {
    let backend = Arc::new(ScriptedBackend::new(
        Err("primary down".to_string()),
        Err("fallback down".to_string()),
    ));
    let app = build_router(test_state(demo_dictionary(), backend));
    let response = app
        .oneshot(translate_post(r#"{"text":"Dom jest duży"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "fallback down");
}
