//! Health, diagnostics and degraded-mode behaviour.

mod common;

use axum::http::StatusCode;
use chat_service::services::providers::mock::MockOutcome;
use chat_service::services::providers::ProviderError;
use chat_service::startup::build_router;
use common::{body_json, broken_client_state, degraded_state, get_request, json_request, mock_state};
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_reports_ready_client() {
    let (_, state) = mock_state(MockOutcome::Echo);
    let app = build_router(state);

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["gemini_client_ready"], true);
}

#[tokio::test]
async fn no_credential_starts_degraded() {
    let app = build_router(degraded_state());

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["gemini_client_ready"], false);
    assert_eq!(body["api_key_configured"], false);

    let response = app
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({"user_message": "Write a function to reverse a string"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(
        body["detail"],
        "Gemini client not initialized. Please check your API key configuration."
    );
}

#[tokio::test]
async fn readiness_is_unaffected_by_failed_requests() {
    let (_, state) = mock_state(MockOutcome::Fail(ProviderError::ApiError(
        "Gemini API error 503: overloaded".to_string(),
    )));
    let app = build_router(state);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/chat", json!({"user_message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    let response = app.oneshot(get_request("/health")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["gemini_client_ready"], true);
}

#[tokio::test]
async fn diagnostics_probe_reports_live_reply() {
    let (provider, state) = mock_state(MockOutcome::Text("Hello, I am working!".to_string()));
    let app = build_router(state);

    let response = app.oneshot(get_request("/test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["client_initialized"], true);
    assert_eq!(body["test_response"], "Hello, I am working!");
    assert_eq!(body["model"], "mock-model");
    assert!(body.get("error").is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn diagnostics_probe_failure_is_still_200() {
    let (_, state) = mock_state(MockOutcome::Fail(ProviderError::RateLimited));
    let app = build_router(state);

    let response = app.oneshot(get_request("/test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Gemini API Error: Rate limited");
    assert!(body.get("test_response").is_none());
}

#[tokio::test]
async fn diagnostics_without_credential_explains_why() {
    let app = build_router(degraded_state());

    let response = app.oneshot(get_request("/test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["client_initialized"], false);
    assert_eq!(body["gemini_api_key_set"], false);
    assert_eq!(body["google_api_key_set"], false);
    assert_eq!(body["google_genai_api_key_set"], false);
    assert!(body["api_key_preview"].is_null());
    assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn client_construction_failure_starts_degraded_with_key() {
    let app = build_router(broken_client_state());

    let response = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["gemini_client_ready"], false);
    assert_eq!(body["api_key_configured"], true);

    let response = app.clone().oneshot(get_request("/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["client_initialized"], false);
    assert_eq!(body["gemini_api_key_set"], true);
    assert_eq!(body["api_key_preview"], "AIzaSyD-12...");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to construct Gemini client"));

    let response = app
        .oneshot(json_request("POST", "/chat", json!({"user_message": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(
        body["detail"],
        "Gemini client not initialized. Please check your API key configuration."
    );
}

#[tokio::test]
async fn metrics_endpoint_serves_text() {
    chat_service::services::init_metrics().unwrap();
    let (_, state) = mock_state(MockOutcome::Echo);
    let app = build_router(state);

    app.clone()
        .oneshot(json_request("POST", "/chat", json!({"user_message": "hi"})))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = common::body_text(response).await;
    assert!(text.contains("chat_requests_total"));
    assert!(text.contains("http_requests_total"));
}
