//! Solve provider trait and request/response types.
//!
//! Defines the interface that all upstream adapters implement, the shared
//! HTTP send path that maps transport failures onto [`SolveError`], and the
//! factory that builds adapters from configuration.

use super::extract::Extraction;
use crate::config::{Config, GenerationConfig, ProviderSettings};
use crate::error::{ConfigError, SolveError};
use crate::types::{ImageUpload, ProviderKind};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Instruction sent with every problem image.
pub const SOLVE_PROMPT: &str = "You are a careful math tutor. The user provided an image of a math problem.
Return ONLY a single JSON object with keys: \"latex\", \"answer\", \"steps\", \"notes\".
- \"latex\": the extracted problem as LaTeX
- \"answer\": the final exact answer(s)
- \"steps\": a numbered step-by-step solution (array or numbered text)
- \"notes\": ambiguous interpretations if any
Do not add any text outside the JSON.
";

const USER_AGENT: &str = concat!("mathlens/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Encode a validated upload.
    pub fn from_upload(upload: &ImageUpload) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&upload.bytes),
            media_type: upload.format.mime_type().to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to solve one problem image.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    /// The problem image
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl SolveRequest {
    /// Build the standard math-problem request.
    pub fn math_problem(image: ImageInput, generation: &GenerationConfig) -> Self {
        Self {
            image,
            prompt: SOLVE_PROMPT.to_string(),
            max_tokens: generation.max_tokens,
            temperature: generation.temperature,
        }
    }
}

/// Upstream payload as received, before text extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Body that is not a JSON object or array
    Text(String),
    /// Structured JSON body
    Json(Value),
}

impl RawResponse {
    /// Classify a response body.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Self::Json(value),
            _ => Self::Text(body),
        }
    }
}

/// Trait that all upstream adapters implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn SolveProvider>` for dynamic dispatch).
#[async_trait]
pub trait SolveProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Provider name for logging.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Model identifier sent upstream.
    fn model(&self) -> &str;

    /// Whether credentials are present. No I/O.
    fn is_configured(&self) -> bool;

    /// Text extraction strategies, highest priority first.
    fn extraction_order(&self) -> &'static [Extraction];

    /// Issue the upstream call and return the raw payload.
    async fn call(&self, request: &SolveRequest) -> Result<RawResponse, SolveError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Send a prepared request and map the outcome onto the error taxonomy.
pub(crate) async fn send_request(
    kind: ProviderKind,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<RawResponse, SolveError> {
    let resp = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(kind, timeout, e))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        tracing::warn!(
            provider = %kind,
            status = status.as_u16(),
            body = %text,
            "Upstream returned an error status"
        );
        return Err(SolveError::UpstreamHttp {
            provider: kind,
            status: status.as_u16(),
            body: (!text.is_empty()).then_some(text),
        });
    }

    let text = resp
        .text()
        .await
        .map_err(|e| transport_error(kind, timeout, e))?;
    Ok(RawResponse::from_body(text))
}

fn transport_error(kind: ProviderKind, timeout: Duration, e: reqwest::Error) -> SolveError {
    if e.is_timeout() {
        SolveError::UpstreamTimeout {
            provider: kind,
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        SolveError::UpstreamUnavailable {
            provider: kind,
            message: e.to_string(),
        }
    }
}

/// Factory that creates adapters from configuration.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the shared HTTP client used by every adapter.
    pub fn http_client() -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("Failed to build HTTP client: {e}")))
    }

    /// Create the adapter for one provider from resolved settings.
    pub fn create(settings: ProviderSettings, client: reqwest::Client) -> Arc<dyn SolveProvider> {
        match settings.kind {
            ProviderKind::Perplexity => {
                Arc::new(super::perplexity::PerplexityProvider::new(settings, client))
            }
            ProviderKind::Gemini => Arc::new(super::gemini::GeminiProvider::new(settings, client)),
            ProviderKind::OpenAi => Arc::new(super::openai::OpenAiProvider::new(settings, client)),
        }
    }

    /// Create adapters for every provider.
    ///
    /// Providers without a key are still created; they answer `NotConfigured`.
    pub fn create_all(config: &Config) -> Result<Vec<Arc<dyn SolveProvider>>, ConfigError> {
        let client = Self::http_client()?;
        Ok(ProviderKind::ALL
            .into_iter()
            .map(|kind| Self::create(config.provider_settings(kind), client.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageFormat;

    fn upload(bytes: &[u8], format: ImageFormat) -> ImageUpload {
        ImageUpload {
            bytes: bytes.to_vec(),
            format,
            filename: None,
        }
    }

    #[test]
    fn test_image_input_from_upload() {
        let input = ImageInput::from_upload(&upload(&[0xFF, 0xD8, 0xFF], ImageFormat::Jpeg));
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_upload(&upload(&[1, 2, 3], ImageFormat::Png));
        assert_eq!(input.data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_math_problem_request() {
        let image = ImageInput::from_upload(&upload(&[1], ImageFormat::Gif));
        let request = SolveRequest::math_problem(image, &GenerationConfig::default());
        assert!(request.prompt.contains("\"latex\", \"answer\", \"steps\", \"notes\""));
        assert_eq!(request.max_tokens, 1500);
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_raw_response_classification() {
        assert!(matches!(
            RawResponse::from_body(r#"{"choices":[]}"#.to_string()),
            RawResponse::Json(_)
        ));
        assert_eq!(
            RawResponse::from_body("plain answer".to_string()),
            RawResponse::Text("plain answer".to_string())
        );
        // A bare JSON string stays text
        assert_eq!(
            RawResponse::from_body("\"quoted\"".to_string()),
            RawResponse::Text("\"quoted\"".to_string())
        );
    }

    #[test]
    fn test_factory_creates_all_providers() {
        let providers = ProviderFactory::create_all(&Config::default()).unwrap();
        let kinds: Vec<_> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, ProviderKind::ALL.to_vec());
    }

    #[test]
    fn test_factory_respects_model_setting() {
        let mut config = Config::default();
        config.providers.gemini.model = "gemini-2.0-pro".to_string();
        let client = ProviderFactory::http_client().unwrap();
        let provider =
            ProviderFactory::create(config.provider_settings(ProviderKind::Gemini), client);
        assert_eq!(provider.model(), "gemini-2.0-pro");
        assert_eq!(provider.name(), "gemini");
    }
}
