//! The chat pipeline: prompt assembly, one Gemini call, outcome mapping.

use crate::error::ChatError;
use crate::models::{ChatRequest, ChatResponse};
use crate::services::bootstrap::ClientHandle;
use crate::services::metrics;
use crate::services::providers::{FinishReason, GenerationParams, GenerationRequest};
use std::time::Instant;

/// Canned answer for questions outside programming and technology.
pub const REFUSAL_LINE: &str =
    "Sorry, I can only answer programming, coding, or technology-related questions.";

/// Fixed system instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are BlueBot, an expert coding and technology assistant. \
You strictly answer only programming, coding, or technology-related questions. \
If a user asks a non-tech question, politely reply: \
'Sorry, I can only answer programming, coding, or technology-related questions.' \
When answering coding questions, always use the user's selected programming language if provided, \
otherwise default to Python. Format code using markdown. \
Be concise, clear, and helpful.";

/// Sampling parameters shared by all calls; requests cannot override them.
pub const GENERATION_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_output_tokens: 2048,
};

const LOG_PREVIEW_CHARS: usize = 50;

/// Prompt used by the live diagnostic probe.
pub const PROBE_PROMPT: &str = "Say 'Hello, I am working!' in one short sentence.";

/// User message followed by the language hint.
pub fn build_prompt(request: &ChatRequest) -> String {
    format!(
        "{message}\n\nPlease use {language} for any code examples if this involves coding.",
        message = request.user_message,
        language = request.language(),
    )
}

/// Everything sent to the provider for `request`.
pub fn build_generation_request(request: &ChatRequest) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: build_prompt(request),
        params: GENERATION_PARAMS,
    }
}

/// Run one chat request against the bootstrap client, if there is one.
///
/// The provider is called at most once and never retried.
pub async fn complete(
    client: Option<&ClientHandle>,
    request: &ChatRequest,
) -> Result<ChatResponse, ChatError> {
    let start = Instant::now();
    let preview: String = request.user_message.chars().take(LOG_PREVIEW_CHARS).collect();

    tracing::info!(
        message_preview = %preview,
        language = %request.language(),
        "Received chat request"
    );

    let result = dispatch(client, request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(response) => {
            metrics::record_chat_outcome("success");
            tracing::info!(
                elapsed_ms,
                response_len = response.response.len(),
                "Chat request completed"
            );
        }
        Err(err) => {
            metrics::record_chat_outcome(err.outcome());
            tracing::error!(elapsed_ms, error = %err, "Chat request failed");
        }
    }

    result
}

async fn dispatch(
    client: Option<&ClientHandle>,
    request: &ChatRequest,
) -> Result<ChatResponse, ChatError> {
    let client = client.ok_or(ChatError::ServiceUnavailable)?;
    let provider = client.provider();
    let generation = build_generation_request(request);

    tracing::debug!(
        model = %provider.model(),
        prompt_len = generation.prompt.len(),
        "Dispatching prompt to Gemini"
    );

    let upstream_start = Instant::now();
    let outcome = provider.generate(&generation).await;
    metrics::record_upstream_latency(provider.model(), upstream_start.elapsed().as_secs_f64());

    let response = outcome.map_err(|e| ChatError::Upstream(e.to_string()))?;
    metrics::record_tokens(provider.model(), response.input_tokens, response.output_tokens);

    tracing::debug!(
        finish_reason = ?response.finish_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "Gemini call finished"
    );
    if response.finish_reason == FinishReason::Length {
        tracing::warn!(
            max_output_tokens = GENERATION_PARAMS.max_output_tokens,
            "Gemini reply truncated at the output token limit"
        );
    }

    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(ChatResponse { response: text }),
        _ => Err(ChatError::EmptyUpstreamResponse),
    }
}

/// One-off live call used by the diagnostics endpoint. Same outcome mapping
/// as [`complete`], but not counted as a chat request.
pub async fn probe(client: &ClientHandle) -> Result<String, ChatError> {
    let provider = client.provider();
    let generation = GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: PROBE_PROMPT.to_string(),
        params: GENERATION_PARAMS,
    };

    let start = Instant::now();
    let outcome = provider.generate(&generation).await;
    tracing::info!(
        model = %provider.model(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        ok = outcome.is_ok(),
        "Gemini probe finished"
    );

    match outcome.map_err(|e| ChatError::Upstream(e.to_string()))?.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ChatError::EmptyUpstreamResponse),
    }
}
