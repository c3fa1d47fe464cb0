//! Configuration management for mathlens.
//!
//! Configuration is loaded from a TOML file with sensible defaults. API keys
//! may reference environment variables (`${GEMINI_API_KEY}`); they are resolved
//! once into [`ProviderSettings`] when providers are built.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for mathlens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Upload and timeout limits
    pub limits: LimitsConfig,

    /// Request gate settings
    pub rate_limit: RateLimitConfig,

    /// Shared sampling parameters
    pub generation: GenerationConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Upstream provider settings
    pub providers: ProvidersConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.mathlens/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "mathlens", "mathlens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".mathlens").join("config.toml")
            })
    }

    /// Get the resolved static frontend directory (with ~ expansion).
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.server.static_dir.as_ref().map(|dir| {
            let path_str = dir.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        })
    }

    /// Upstream call timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.request_timeout_ms)
    }

    /// Raw config section for a provider.
    pub fn provider(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Perplexity => &self.providers.perplexity,
            ProviderKind::Gemini => &self.providers.gemini,
            ProviderKind::OpenAi => &self.providers.openai,
        }
    }

    /// Mutable config section for a provider (used by CLI overrides).
    pub fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderConfig {
        match kind {
            ProviderKind::Perplexity => &mut self.providers.perplexity,
            ProviderKind::Gemini => &mut self.providers.gemini,
            ProviderKind::OpenAi => &mut self.providers.openai,
        }
    }

    /// Resolve a provider's settings, looking up `${ENV_VAR}` key references.
    pub fn provider_settings(&self, kind: ProviderKind) -> ProviderSettings {
        let cfg = self.provider(kind);
        ProviderSettings {
            kind,
            api_key: resolve_env_var(&cfg.api_key),
            model: cfg.model.clone(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            timeout: self.request_timeout(),
        }
    }

    /// Validate after programmatic changes (e.g. CLI overrides).
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Fully resolved settings handed to a provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// `None` when no key is configured; the adapter reports `NotConfigured`
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
