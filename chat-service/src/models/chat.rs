use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "Python";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl ChatRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Requested language, falling back to Python when blank.
    pub fn language(&self) -> &str {
        let language = self.language.trim();
        if language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            language
        }
    }
}

/// Successful reply of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
