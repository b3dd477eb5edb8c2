use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gemini REST endpoint used when `GEMINI_API_BASE` is not set.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Relative to the working directory, like the other bundled assets.
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub gemini: GeminiSettings,
    pub frontend: FrontendConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for every chat completion (e.g., gemini-2.5-flash)
    pub text_model: String,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Directory holding `frontend.html` and its assets.
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the service settings from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = get_env(&lookup, "GEMINI_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("GEMINI_TIMEOUT_SECS is not a number: {}", e))
            })?;

        let allowed_origins = get_env(&lookup, "CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ChatConfig {
            common,
            models: ModelConfig {
                text_model: get_env(&lookup, "GENAI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            },
            gemini: GeminiSettings {
                api_base: get_env(&lookup, "GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                timeout: Duration::from_secs(timeout_secs),
            },
            frontend: FrontendConfig {
                static_dir: PathBuf::from(get_env(&lookup, "STATIC_DIR", DEFAULT_STATIC_DIR)),
            },
            cors: CorsConfig { allowed_origins },
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
