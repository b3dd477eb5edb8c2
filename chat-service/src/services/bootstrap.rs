//! One-time construction of the Gemini client at process start.
//!
//! The outcome is an immutable [`Bootstrap`] value shared through the router
//! state. A missing key or a failed construction leaves the service running
//! in degraded mode: `client()` stays `None` for the life of the process.

use crate::config::ChatConfig;
use crate::error::BootstrapError;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

/// Credential sources, highest priority first.
pub const CREDENTIAL_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GENAI_API_KEY"];

const PREVIEW_CHARS: usize = 10;

/// API key plus the variable it was read from.
#[derive(Debug, Clone)]
pub struct Credential {
    source: &'static str,
    value: Secret<String>,
}

impl Credential {
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn secret(&self) -> &Secret<String> {
        &self.value
    }

    /// First ten characters followed by an ellipsis.
    pub fn preview(&self) -> String {
        let head: String = self.value.expose_secret().chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// Which credential variables held a non-empty value at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialPresence {
    pub gemini_api_key: bool,
    pub google_api_key: bool,
    pub google_genai_api_key: bool,
}

impl CredentialPresence {
    fn detect<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| non_empty(lookup(key)).is_some();
        Self {
            gemini_api_key: set(CREDENTIAL_VARS[0]),
            google_api_key: set(CREDENTIAL_VARS[1]),
            google_genai_api_key: set(CREDENTIAL_VARS[2]),
        }
    }
}

/// The bound client handed to the chat pipeline.
#[derive(Clone)]
pub struct ClientHandle {
    provider: Arc<dyn TextProvider>,
}

impl ClientHandle {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn TextProvider {
        self.provider.as_ref()
    }
}

/// Outcome of the single startup attempt to build a client.
pub struct Bootstrap {
    credential: Option<Credential>,
    presence: CredentialPresence,
    client: Option<ClientHandle>,
    failure: Option<BootstrapError>,
}

impl Bootstrap {
    /// Resolve the key from the process environment and build the Gemini client.
    pub fn from_env(config: &ChatConfig) -> Self {
        Self::initialize(config, |key| std::env::var(key).ok())
    }

    /// Resolve the key from `lookup` and build the Gemini client.
    ///
    /// Never fails: errors are logged and recorded as degraded mode.
    pub fn initialize<F>(config: &ChatConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let presence = CredentialPresence::detect(&lookup);

        let credential = match resolve_credential(&lookup) {
            Ok(credential) => credential,
            Err(err) => {
                tracing::error!(error = %err, "Gemini client unavailable");
                return Self {
                    credential: None,
                    presence,
                    client: None,
                    failure: Some(err),
                };
            }
        };

        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: credential.secret().clone(),
            model: config.models.text_model.clone(),
            api_base: config.gemini.api_base.clone(),
            timeout: config.gemini.timeout,
        });

        match provider {
            Ok(provider) => {
                tracing::info!(
                    source = credential.source(),
                    api_key_preview = %credential.preview(),
                    model = %config.models.text_model,
                    "Gemini client initialized successfully"
                );
                Self {
                    credential: Some(credential),
                    presence,
                    client: Some(ClientHandle::new(Arc::new(provider))),
                    failure: None,
                }
            }
            Err(e) => {
                let err = BootstrapError::ClientConstruction(e.to_string());
                tracing::error!(
                    source = credential.source(),
                    error = %err,
                    "Gemini client unavailable"
                );
                Self {
                    credential: Some(credential),
                    presence,
                    client: None,
                    failure: Some(err),
                }
            }
        }
    }

    /// A ready bootstrap around an arbitrary provider.
    pub fn with_provider(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            credential: None,
            presence: CredentialPresence::default(),
            client: Some(ClientHandle::new(provider)),
            failure: None,
        }
    }

    pub fn client(&self) -> Option<&ClientHandle> {
        self.client.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    pub fn api_key_configured(&self) -> bool {
        self.credential.is_some()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn presence(&self) -> CredentialPresence {
        self.presence
    }

    pub fn failure(&self) -> Option<&BootstrapError> {
        self.failure.as_ref()
    }
}

/// First non-empty value among [`CREDENTIAL_VARS`], in priority order.
pub fn resolve_credential<F>(lookup: &F) -> Result<Credential, BootstrapError>
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_VARS
        .iter()
        .find_map(|&source| {
            non_empty(lookup(source)).map(|value| Credential {
                source,
                value: Secret::new(value),
            })
        })
        .ok_or(BootstrapError::MissingCredential)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
