//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.bind must not be empty".into(),
            ));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_bytes must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.rate_limit.enabled && self.rate_limit.requests == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.requests must be > 0 when rate limiting is enabled".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.window_secs must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.generation.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_tokens must be > 0".into(),
            ));
        }
        for (name, provider) in [
            ("perplexity", &self.providers.perplexity),
            ("gemini", &self.providers.gemini),
            ("openai", &self.providers.openai),
        ] {
            if provider.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.model must not be empty"
                )));
            }
            if !provider.endpoint.starts_with("http://") && !provider.endpoint.starts_with("https://")
            {
                return Err(ConfigError::ValidationError(format!(
                    "providers.{name}.endpoint must be an http(s) URL"
                )));
            }
        }
        Ok(())
    }
}
