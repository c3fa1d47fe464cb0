//! Solve pipeline: validated upload → provider call → text → recovered JSON.
//!
//! The solver owns one adapter per provider. Credentials are checked before
//! the image is encoded, the upstream call is bounded by the provider's
//! timeout, and every provider's answer is normalized into [`ParsedResult`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, GenerationConfig};
use crate::error::{ConfigError, SolveError, SolveResult};
use crate::llm::{extract_text, recover_json, ImageInput, ProviderFactory, SolveProvider, SolveRequest};
use crate::types::{ImageUpload, ParsedResult, ProviderKind};

/// Routes solve requests to upstream providers.
pub struct Solver {
    providers: HashMap<ProviderKind, Arc<dyn SolveProvider>>,
    generation: GenerationConfig,
}

impl Solver {
    /// Create a solver with no providers registered.
    pub fn new(generation: GenerationConfig) -> Self {
        Self {
            providers: HashMap::new(),
            generation,
        }
    }

    /// Build a solver with every provider from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let solver = ProviderFactory::create_all(config)?
            .into_iter()
            .fold(Self::new(config.generation.clone()), Self::with_provider);

        for kind in ProviderKind::ALL {
            match solver.providers.get(&kind) {
                Some(p) if p.is_configured() => {
                    tracing::info!(provider = %kind, model = p.model(), "Provider configured")
                }
                _ => tracing::warn!(
                    provider = %kind,
                    "No API key ({} not set); requests will fail",
                    kind.api_key_env()
                ),
            }
        }
        Ok(solver)
    }

    /// Register (or replace) the adapter for its provider kind.
    pub fn with_provider(mut self, provider: Arc<dyn SolveProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Providers that have credentials.
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.get(kind).is_some_and(|p| p.is_configured()))
            .collect()
    }

    /// Solve one problem image with the given provider.
    pub async fn solve(&self, kind: ProviderKind, upload: &ImageUpload) -> SolveResult<ParsedResult> {
        let provider = self
            .providers
            .get(&kind)
            .filter(|p| p.is_configured())
            .ok_or(SolveError::NotConfigured { provider: kind })?;

        let request = SolveRequest::math_problem(ImageInput::from_upload(upload), &self.generation);
        let timeout = provider.timeout();
        let start = Instant::now();

        let raw = match tokio::time::timeout(timeout, provider.call(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = %kind,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Upstream call failed: {e}"
                );
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(provider = %kind, timeout_ms = timeout.as_millis() as u64, "Upstream call timed out");
                return Err(SolveError::UpstreamTimeout {
                    provider: kind,
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
        };

        let text = extract_text(&raw, provider.extraction_order());
        let parsed = recover_json(&text);

        tracing::info!(
            provider = %kind,
            model = provider.model(),
            latency_ms = start.elapsed().as_millis() as u64,
            raw_len = text.len(),
            parsed = parsed.is_some(),
            "Solve completed"
        );

        Ok(ParsedResult { raw: text, parsed })
    }
}
