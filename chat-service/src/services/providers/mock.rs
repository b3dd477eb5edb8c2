//! Mock provider implementation for testing.

use super::{
    FinishReason, GenerationRequest, ProviderError, ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use std::sync::Mutex;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Fixed text.
    Text(String),
    /// Echo the prompt back, prefixed like a model reply.
    Echo,
    /// Text cut off at the output token limit.
    Truncated(String),
    /// A successful call that carries no text.
    Empty,
    /// The call fails with this error.
    Fail(ProviderError),
}

/// Mock text provider that records every request it receives.
pub struct MockTextProvider {
    outcome: MockOutcome,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextProvider {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }

        let (text, finish_reason) = match &self.outcome {
            MockOutcome::Text(text) => (Some(text.clone()), FinishReason::Complete),
            MockOutcome::Echo => (
                Some(format!("Mock response for: {}", request.prompt)),
                FinishReason::Complete,
            ),
            MockOutcome::Truncated(text) => (Some(text.clone()), FinishReason::Length),
            MockOutcome::Empty => (None, FinishReason::Complete),
            MockOutcome::Fail(err) => return Err(err.clone()),
        };

        Ok(ProviderResponse {
            text,
            input_tokens: request.prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason,
        })
    }
}
