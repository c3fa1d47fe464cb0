//! OpenAI provider using the Responses API.
//!
//! Sends the prompt as an `input_text` block and the image as an
//! `input_image` data URL. Answers come back as typed `output` blocks.

use super::extract::Extraction;
use super::provider::{send_request, RawResponse, SolveProvider, SolveRequest};
use crate::config::ProviderSettings;
use crate::error::SolveError;
use crate::types::ProviderKind;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const EXTRACTION_ORDER: &[Extraction] = &[
    Extraction::TextAccessor,
    Extraction::OutputBlocks,
    Extraction::ChatCompletion,
];

/// OpenAI provider using the Responses API.
pub struct OpenAiProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings, client: reqwest::Client) -> Self {
        Self { settings, client }
    }

    fn build_body(&self, request: &SolveRequest) -> ResponsesRequest {
        ResponsesRequest {
            model: self.settings.model.clone(),
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            input: vec![InputMessage {
                role: "user".to_string(),
                content: vec![
                    InputContent::InputText {
                        text: request.prompt.clone(),
                    },
                    InputContent::InputImage {
                        image_url: request.image.data_url(),
                    },
                ],
            }],
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct InputMessage {
    role: String,
    content: Vec<InputContent>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent {
    InputText { text: String },
    InputImage { image_url: String },
}

#[async_trait]
impl SolveProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        tracing::debug!(model = %self.settings.model, "Calling OpenAI responses");

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
