use crate::error::rejection_response;
use crate::models::{ChatRequest, ChatResponse};
use crate::services::chat;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use service_core::middleware::RequestId;
use tracing::Instrument;

/// `POST /chat`: run the pipeline and map failures to `500 {"detail": ...}`.
///
/// Bodies the `Json` extractor rejects keep their 4xx status with a JSON
/// `detail` and never reach the pipeline.
pub async fn chat(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, Response> {
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| "-".to_string());

    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(
            request_id = %request_id,
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Rejected chat request body"
        );
        rejection_response(rejection)
    })?;

    let span = tracing::info_span!("chat", request_id = %request_id);

    chat::complete(state.bootstrap.client(), &request)
        .instrument(span)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}
