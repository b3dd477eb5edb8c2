//! Failure kinds of the chat service and their HTTP shape.

use crate::services::bootstrap::CREDENTIAL_VARS;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Why the Gemini client could not be created at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error(
        "API key not found. Please set one of these environment variables: {}",
        CREDENTIAL_VARS.join(", ")
    )]
    MissingCredential,

    #[error("Failed to construct Gemini client: {0}")]
    ClientConstruction(String),
}

/// Per-request failures of the chat pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Gemini client not initialized. Please check your API key configuration.")]
    ServiceUnavailable,

    #[error("Gemini API Error: {0}")]
    Upstream(String),

    #[error("Gemini API returned an empty response.")]
    EmptyUpstreamResponse,
}

impl ChatError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            ChatError::ServiceUnavailable => "service_unavailable",
            ChatError::Upstream(_) => "upstream_error",
            ChatError::EmptyUpstreamResponse => "empty_response",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Malformed `/chat` bodies keep axum's status but use the `{"detail"}` shape.
pub fn rejection_response(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(ErrorBody {
            detail: rejection.body_text(),
        }),
    )
        .into_response()
}
