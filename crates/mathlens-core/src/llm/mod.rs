//! LLM integration for solving problem images.
//!
//! Provides a provider abstraction over the upstream backends (Perplexity,
//! Gemini, OpenAI) plus the normalization layer that turns their differing
//! responses into plain text and, where possible, a recovered JSON object.

pub(crate) mod extract;
pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod perplexity;
pub(crate) mod provider;
pub(crate) mod recover;

pub use extract::{extract_text, Extraction};
pub use provider::{
    ImageInput, ProviderFactory, RawResponse, SolveProvider, SolveRequest, SOLVE_PROMPT,
};
pub use recover::recover_json;
