#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use chat_service::config::ChatConfig;
use chat_service::services::providers::mock::{MockOutcome, MockTextProvider};
use chat_service::services::Bootstrap;
use chat_service::startup::{AppState, Application};
use http_body_util::BodyExt;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub fn core_config() -> CoreConfig {
    CoreConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Random port for testing
        log_level: "info".to_string(),
    }
}

/// Service config built only from `vars`, never from the process environment.
/// `STATIC_DIR` points at the crate's bundled frontend unless overridden.
pub fn test_config(vars: &[(&str, &str)]) -> ChatConfig {
    let mut vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.entry("STATIC_DIR".to_string())
        .or_insert_with(|| concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string());
    ChatConfig::from_lookup(core_config(), |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

/// App state whose client is a mock with the given outcome.
pub fn mock_state(outcome: MockOutcome) -> (Arc<MockTextProvider>, AppState) {
    let provider = Arc::new(MockTextProvider::new(outcome));
    let state = AppState::new(test_config(&[]), Bootstrap::with_provider(provider.clone()));
    (provider, state)
}

/// App state bootstrapped with no credential at all.
pub fn degraded_state() -> AppState {
    let config = test_config(&[]);
    let bootstrap = Bootstrap::initialize(&config, |_| None);
    AppState::new(config, bootstrap)
}

/// App state with a key whose client could not be built (unusable API base).
pub fn broken_client_state() -> AppState {
    let config = test_config(&[("GEMINI_API_BASE", "not a url")]);
    let bootstrap = Bootstrap::initialize(&config, |key| {
        (key == "GEMINI_API_KEY").then(|| "AIzaSyD-1234567890abcdef".to_string())
    });
    AppState::new(config, bootstrap)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// A request as seen by the fake Gemini endpoint.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub model_method: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeGeminiState {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Local stand-in for the Gemini REST API.
pub struct FakeGemini {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeGemini {
    /// Serve `reply` with `status` for every `generateContent` call.
    pub async fn spawn(status: StatusCode, reply: Value) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = FakeGeminiState {
            status,
            reply,
            seen: seen.clone(),
        };

        let app = Router::new()
            .route("/v1beta/models/:model_method", post(fake_generate))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini listener");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/v1beta", port),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn fake_generate(
    State(state): State<FakeGeminiState>,
    Path(model_method): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    state.seen.lock().unwrap().push(SeenRequest {
        model_method,
        api_key,
        body,
    });

    (state.status, Json(state.reply.clone()))
}

/// Gemini reply with a single text part.
pub fn gemini_text_reply(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 8, "totalTokenCount": 28}
    })
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the full application on a random port.
    pub async fn spawn(config: ChatConfig, bootstrap: Bootstrap) -> Self {
        let app = Application::build(config, bootstrap)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
