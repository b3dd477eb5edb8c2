//! Text generation provider abstraction.
//!
//! The pipeline only talks to [`TextProvider`], so the Gemini client can be
//! swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text, `None` when the model returned no text parts.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: i32,
}

/// One single-turn generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub params: GenerationParams,
}

/// Trait for single-shot text generation backends (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Model identifier, for logs and diagnostics.
    fn model(&self) -> &str;

    /// Generate a complete (non-streamed) response.
    async fn generate(&self, request: &GenerationRequest) -> Result<ProviderResponse, ProviderError>;
}
