//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,

    /// Allowed CORS origins; `"*"` allows any origin
    pub cors_allow_origins: Vec<String>,

    /// Directory holding a bundled frontend to serve at `/`
    pub static_dir: Option<PathBuf>,

    /// Echo upstream error bodies to clients (development only)
    pub expose_upstream_errors: bool,

    /// Use the first `X-Forwarded-For` entry as the client address.
    /// Only enable behind a reverse proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors_allow_origins: vec!["*".to_string()],
            static_dir: None,
            expose_upstream_errors: false,
            trust_forwarded_for: false,
        }
    }
}

/// Resource limits applied to every solve request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes
    pub max_upload_bytes: u64,

    /// Upstream call timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            request_timeout_ms: 30_000,
        }
    }
}

/// Per-client request gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether the gate is applied to solve routes
    pub enabled: bool,

    /// Requests allowed per client per window
    pub requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: 10,
            window_secs: 60,
        }
    }
}

/// Sampling parameters shared by all providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 1500,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Upstream provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub perplexity: ProviderConfig,
    pub gemini: ProviderConfig,
    pub openai: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            perplexity: ProviderConfig {
                api_key: "${PERPLEXITY_API_KEY}".to_string(),
                model: "sonar".to_string(),
                endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
            },
            gemini: ProviderConfig {
                api_key: "${GEMINI_API_KEY}".to_string(),
                model: "gemini-2.5-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            },
            openai: ProviderConfig {
                api_key: "${OPENAI_API_KEY}".to_string(),
                model: "gpt-4o-mini".to_string(),
                endpoint: "https://api.openai.com/v1/responses".to_string(),
            },
        }
    }
}

/// Settings for a single upstream provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// API endpoint
    pub endpoint: String,
}
