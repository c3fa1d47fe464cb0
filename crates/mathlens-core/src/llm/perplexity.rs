//! Perplexity provider using its Chat Completions API.
//!
//! Sends the image as a data URL content part next to the prompt.

use super::extract::Extraction;
use super::provider::{send_request, RawResponse, SolveProvider, SolveRequest};
use crate::config::ProviderSettings;
use crate::error::SolveError;
use crate::types::ProviderKind;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const EXTRACTION_ORDER: &[Extraction] = &[
    Extraction::ChatCompletion,
    Extraction::TextAccessor,
    Extraction::OutputBlocks,
];

/// Perplexity provider using Chat Completions.
pub struct PerplexityProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl PerplexityProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    fn build_body(&self, request: &SolveRequest) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[async_trait]
impl SolveProvider for PerplexityProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Perplexity
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    fn extraction_order(&self) -> &'static [Extraction] {
        EXTRACTION_ORDER
    }

    async fn call(&self, request: &SolveRequest) -> Result<RawResponse, SolveError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(SolveError::NotConfigured {
                provider: self.kind(),
            })?;

        let body = self.build_body(request);
        tracing::debug!(model = %self.settings.model, "Calling Perplexity chat completions");

        let builder = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body);
        send_request(self.kind(), builder, self.timeout()).await
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::llm::provider::ImageInput;

    fn settings(api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            kind: ProviderKind::Perplexity,
            api_key: api_key.map(String::from),
            model: "sonar".to_string(),
            // Nothing listens here; a real call would fail with UpstreamUnavailable
            endpoint: "http://127.0.0.1:9/chat/completions".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    fn request() -> SolveRequest {
        let image = ImageInput {
            data: "AQID".to_string(),
            media_type: "image/png".to_string(),
        };
        SolveRequest::math_problem(image, &GenerationConfig::default())
    }

    #[test]
    fn test_body_embeds_image_as_data_url() {
        let provider = PerplexityProvider::new(settings(Some("k")), reqwest::Client::new());
        let body = serde_json::to_value(provider.build_body(&request())).unwrap();

        assert_eq!(body["model"], "sonar");
        assert_eq!(body["max_tokens"], 1500);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert!(content[0]["text"].as_str().unwrap().contains("math tutor"));
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let provider = PerplexityProvider::new(settings(None), reqwest::Client::new());
        assert!(!provider.is_configured());
        let err = provider.call(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            SolveError::NotConfigured {
                provider: ProviderKind::Perplexity
            }
        ));
    }
}
