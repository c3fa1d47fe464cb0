//! Gemini provider using the `generateContent` REST API.
//!
//! The image travels as an `inlineData` part (base64 bytes plus MIME type)
//! ahead of the prompt text part.

use super::extract::Extraction;
use super::provider::{send_request, RawResponse, SolveProvider, SolveRequest};
use crate::config::ProviderSettings;
use crate::error::SolveError;
use crate::types::ProviderKind;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const EXTRACTION_ORDER: &[Extraction] = &[
    Extraction::CandidateText,
    Extraction::TextAccessor,
    Extraction::OutputBlocks,
];

/// Gemini provider.
pub struct GeminiProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    /// `{endpoint}/models/{model}:generateContent`
    ///
    /// Accepts model names with or without the `models/` prefix.
    fn url(&self) -> String {
        let model = self
            .settings
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.settings.model);
        format!("{}/models/{}:generateContent", self.settings.endpoint, model)
    }

    fn build_body(&self, request: &SolveRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[async_trait]
impl SolveProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
        tracing::debug!(model = %self.settings.model, "Calling Gemini generateContent");

        // Key goes in a header so it never appears in logged URLs
        let builder = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body);
        send_request(self.kind(), builder, self.timeout()).await
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}
