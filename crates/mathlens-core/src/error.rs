//! Error types for mathlens.
//!
//! Errors are split by concern: configuration problems surface at startup,
//! upload and solve errors are request-scoped and carry enough context to
//! choose a status code without leaking upstream internals to clients.

use crate::types::{ErrorKind, ErrorResult, ProviderKind};
use thiserror::Error;

/// Top-level error type for mathlens operations.
#[derive(Error, Debug)]
pub enum MathlensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request processing errors
    #[error("Solve error: {0}")]
    Solve(#[from] SolveError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Reasons an uploaded image is rejected before any provider is called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The multipart form had no `file` field
    #[error("Missing 'file' field in upload")]
    MissingFile,

    /// Declared content type is not an accepted image type
    #[error("Unsupported content type '{content_type}' (expected jpeg, png, webp or gif)")]
    InvalidType { content_type: String },

    /// Upload exceeds the size limit
    #[error("Upload exceeds maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    /// Upload contained zero bytes
    #[error("Uploaded file is empty")]
    Empty,

    /// Reading the upload body failed
    #[error("Failed reading uploaded file: {0}")]
    ReadFailure(String),
}

/// Request-scoped failures of the solve pipeline.
#[derive(Error, Debug)]
pub enum SolveError {
    /// Provider has no API key configured
    #[error("{} not set", .provider.api_key_env())]
    NotConfigured { provider: ProviderKind },

    /// Upload failed validation
    #[error(transparent)]
    InvalidUpload(#[from] UploadError),

    /// Upstream did not answer within the timeout
    #[error("{} request timed out after {timeout_ms}ms", .provider.display_name())]
    UpstreamTimeout {
        provider: ProviderKind,
        timeout_ms: u64,
    },

    /// Upstream answered with a non-2xx status
    #[error("{} HTTP error {status}", .provider.display_name())]
    UpstreamHttp {
        provider: ProviderKind,
        status: u16,
        body: Option<String>,
    },

    /// Transport-level failure (DNS, connect, TLS, broken body)
    #[error("{} call failed: {message}", .provider.display_name())]
    UpstreamUnavailable {
        provider: ProviderKind,
        message: String,
    },

    /// Client exceeded the request gate's limit
    #[error("Rate limit exceeded: {limit} per {window_secs} seconds")]
    RateLimited {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured { .. } => ErrorKind::NotConfigured,
            Self::InvalidUpload(_) => ErrorKind::InvalidUpload,
            Self::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            Self::UpstreamHttp { .. } => ErrorKind::UpstreamHttpError,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
        }
    }

    /// Build the client-facing error.
    ///
    /// Upstream bodies and transport messages are only included when
    /// `expose_upstream` is set; they are always logged by the caller.
    pub fn to_error_result(&self, expose_upstream: bool) -> ErrorResult {
        let (message, detail) = match self {
            Self::NotConfigured { .. } => (self.to_string(), None),
            Self::InvalidUpload(e) => ("Invalid upload".to_string(), Some(e.to_string())),
            Self::UpstreamTimeout { .. } => (self.to_string(), None),
            Self::UpstreamHttp { provider, status, body } => (
                format!("{} HTTP error", provider.display_name()),
                if expose_upstream {
                    Some(match body {
                        Some(body) if !body.is_empty() => format!("status {status}: {body}"),
                        _ => format!("status {status}"),
                    })
                } else {
                    Some(format!("upstream returned status {status}"))
                },
            ),
            Self::UpstreamUnavailable { provider, message } => (
                format!("{} call failed", provider.display_name()),
                expose_upstream.then(|| message.clone()),
            ),
            Self::RateLimited { .. } => (self.to_string(), None),
        };

        ErrorResult {
            kind: self.kind(),
            message,
            detail,
        }
    }
}

/// Convenience type alias for mathlens results.
pub type Result<T> = std::result::Result<T, MathlensError>;

/// Convenience type alias for solve pipeline results.
pub type SolveResult<T> = std::result::Result<T, SolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_names_env_var() {
        let err = SolveError::NotConfigured {
            provider: ProviderKind::Gemini,
        };
        assert_eq!(err.to_string(), "GEMINI_API_KEY not set");
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[test]
    fn test_upstream_body_hidden_by_default() {
        let err = SolveError::UpstreamHttp {
            provider: ProviderKind::OpenAi,
            status: 401,
            body: Some("{\"error\":\"invalid key sk-123\"}".to_string()),
        };
        let result = err.to_error_result(false);
        assert_eq!(result.kind, ErrorKind::UpstreamHttpError);
        assert_eq!(result.message, "OpenAI HTTP error");
        let detail = result.detail.unwrap();
        assert!(detail.contains("401"));
        assert!(!detail.contains("sk-123"));
    }

    #[test]
    fn test_upstream_body_exposed_when_enabled() {
        let err = SolveError::UpstreamHttp {
            provider: ProviderKind::Perplexity,
            status: 500,
            body: Some("boom".to_string()),
        };
        let result = err.to_error_result(true);
        assert_eq!(result.detail.as_deref(), Some("status 500: boom"));
    }

    #[test]
    fn test_transport_message_hidden_by_default() {
        let err = SolveError::UpstreamUnavailable {
            provider: ProviderKind::Gemini,
            message: "dns error: no such host internal.example".to_string(),
        };
        assert_eq!(err.to_error_result(false).detail, None);
        assert!(err
            .to_error_result(true)
            .detail
            .unwrap()
            .contains("internal.example"));
    }

    #[test]
    fn test_invalid_upload_detail() {
        let err = SolveError::from(UploadError::TooLarge { max_bytes: 10 });
        let result = err.to_error_result(false);
        assert_eq!(result.kind, ErrorKind::InvalidUpload);
        assert!(result.detail.unwrap().contains("10 bytes"));
    }
}
