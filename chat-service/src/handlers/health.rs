use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness plus the bootstrap outcome. Always 200.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "gemini_client_ready": state.bootstrap.is_ready(),
        "api_key_configured": state.bootstrap.api_key_configured(),
    }))
}
