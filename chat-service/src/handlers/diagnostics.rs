//! Operator-facing diagnostics.
//!
//! `GET /test` makes a live Gemini call on every hit. It exists for manual
//! debugging of key setup only; it is not a health probe.

use crate::error::ChatError;
use crate::services::chat;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub gemini_api_key_set: bool,
    pub google_api_key_set: bool,
    pub google_genai_api_key_set: bool,
    pub api_key_source: Option<&'static str>,
    pub api_key_preview: Option<String>,
    pub client_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /test`: credential flags, redacted key and a live probe. Always 200.
pub async fn live_probe(State(state): State<AppState>) -> Json<ProbeReport> {
    let bootstrap = &state.bootstrap;
    let presence = bootstrap.presence();
    let credential = bootstrap.credential();

    let mut report = ProbeReport {
        gemini_api_key_set: presence.gemini_api_key,
        google_api_key_set: presence.google_api_key,
        google_genai_api_key_set: presence.google_genai_api_key,
        api_key_source: credential.map(|c| c.source()),
        api_key_preview: credential.map(|c| c.preview()),
        client_initialized: bootstrap.is_ready(),
        model: None,
        test_response: None,
        error: None,
    };

    let Some(client) = bootstrap.client() else {
        report.error = Some(
            bootstrap
                .failure()
                .map(|f| f.to_string())
                .unwrap_or_else(|| ChatError::ServiceUnavailable.to_string()),
        );
        return Json(report);
    };

    report.model = Some(client.provider().model().to_string());
    match chat::probe(client).await {
        Ok(text) => report.test_response = Some(text),
        Err(e) => report.error = Some(e.to_string()),
    }

    Json(report)
}
