//! Locating the assistant's text inside heterogeneous upstream responses.
//!
//! Each provider declares an ordered list of [`Extraction`] strategies. The
//! first strategy yielding non-empty text wins; when none does, the whole
//! response is stringified. Extraction never fails.

use super::provider::RawResponse;
use serde_json::Value;

/// Known places an upstream response keeps its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Chat Completions: `choices[0].message.content`
    ChatCompletion,
    /// Gemini `generateContent`: text parts of the first candidate, concatenated
    CandidateText,
    /// Top-level `text` or `output_text` accessor
    TextAccessor,
    /// Responses-style `output[*].content[*]` typed blocks
    OutputBlocks,
}

impl Extraction {
    /// Try this strategy against a JSON response.
    pub fn apply(self, value: &Value) -> Option<String> {
        let text = match self {
            Self::ChatCompletion => chat_completion(value),
            Self::CandidateText => candidate_text(value),
            Self::TextAccessor => text_accessor(value),
            Self::OutputBlocks => output_blocks(value),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Extract the assistant text from a raw response.
///
/// Plain-text bodies are returned unchanged.
pub fn extract_text(raw: &RawResponse, order: &[Extraction]) -> String {
    match raw {
        RawResponse::Text(text) => text.clone(),
        RawResponse::Json(value) => order
            .iter()
            .find_map(|strategy| strategy.apply(value))
            .unwrap_or_else(|| {
                tracing::debug!("No extraction strategy matched, stringifying response");
                value.to_string()
            }),
    }
}

fn chat_completion(value: &Value) -> Option<String> {
    let content = value.pointer("/choices/0/message/content")?;
    match content {
        Value::String(text) => Some(text.clone()),
        // Some compatible servers return content as a list of typed parts
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>(),
        ),
        _ => None,
    }
}

fn candidate_text(value: &Value) -> Option<String> {
    let parts = value.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

fn text_accessor(value: &Value) -> Option<String> {
    value
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| value.get("output_text").and_then(Value::as_str))
        .map(String::from)
}

fn output_blocks(value: &Value) -> Option<String> {
    value
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        // `output_text` blocks carry their text in `text`, as do most other block types
        .find_map(|block| {
            block
                .get("text")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(String::from)
        })
}
