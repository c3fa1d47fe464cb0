//! Core data types shared across the solve pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Upstream LLM providers that can solve a problem image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Perplexity,
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// All providers, in the order their routes are registered.
    pub const ALL: [ProviderKind; 3] = [Self::Perplexity, Self::Gemini, Self::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perplexity => "perplexity",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Human-facing provider name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Perplexity => "Perplexity",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Environment variable conventionally holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Perplexity => "PERPLEXITY_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// HTTP route serving this provider (`/solve-{provider}`).
    pub fn route(&self) -> &'static str {
        match self {
            Self::Perplexity => "/solve-perplexity",
            Self::Gemini => "/solve-gemini",
            Self::OpenAi => "/solve-openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perplexity" => Ok(Self::Perplexity),
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Parse a declared content type.
    ///
    /// Case-insensitive; MIME parameters (`; charset=...`) are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Canonical MIME type sent upstream.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// A validated image upload, ready to hand to one provider call.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes (non-empty, within the configured limit)
    pub bytes: Vec<u8>,
    /// Format derived from the declared content type
    pub format: ImageFormat,
    /// Filename declared by the client, if any
    pub filename: Option<String>,
}

impl ImageUpload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Uniform result of a solve call, whichever provider served it.
///
/// `parsed` is `null` when no JSON object could be recovered from `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub raw: String,
    pub parsed: Option<Value>,
}

/// Error classification used to pick a user-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    InvalidUpload,
    UpstreamTimeout,
    UpstreamHttpError,
    UpstreamUnavailable,
    RateLimited,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::InvalidUpload => "invalid_upload",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UpstreamHttpError => "upstream_http_error",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::RateLimited => "rate_limited",
        }
    }
}

/// Client-safe description of a failed solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_mime("image/webp; charset=binary"),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::from_mime("image/gif"), Some(ImageFormat::Gif));
    }

    #[test]
    fn test_image_format_rejects_other_types() {
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
        assert_eq!(ImageFormat::from_mime("image/svg+xml"), None);
        assert_eq!(ImageFormat::from_mime(""), None);
    }

    #[test]
    fn test_provider_kind_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>(), Ok(kind));
        }
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_routes() {
        assert_eq!(ProviderKind::Gemini.route(), "/solve-gemini");
        assert_eq!(ProviderKind::OpenAi.route(), "/solve-openai");
    }

    #[test]
    fn test_parsed_result_serializes_null() {
        let result = ParsedResult {
            raw: "no json here".to_string(),
            parsed: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["raw"], "no json here");
        assert!(json["parsed"].is_null());
    }
}
