//! Per-provider request building and answer extraction.
//!
//! Three wire dialects cover the five providers:
//!
//! - [`openai`]: OpenAI-style chat completions (ChatGPT, Grok, Perplexity)
//! - [`anthropic`]: Anthropic messages API (Claude)
//! - [`gemini`]: Google `generateContent` (Gemini)

pub mod anthropic;
pub mod gemini;
pub mod openai;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::provider::ProviderDescriptor;
use crate::transport::OutboundRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

/// What every provider dialect must be able to do.
pub trait ProviderAdapter: Send + Sync {
    fn build_request(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        credential: &str,
    ) -> OutboundRequest;

    fn extract_text(&self, body: &Value) -> Result<String, ExtractError>;

    /// Model label reported by the provider, if the response carries one.
    fn extract_model(&self, body: &Value) -> Option<String> {
        body.get("model").and_then(Value::as_str).map(String::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    OpenAiCompatible,
    Anthropic,
    Gemini,
}

impl AdapterKind {
    pub fn adapter(self) -> &'static dyn ProviderAdapter {
        match self {
            AdapterKind::OpenAiCompatible => &openai::OpenAiChat,
            AdapterKind::Anthropic => &anthropic::AnthropicMessages,
            AdapterKind::Gemini => &gemini::GeminiGenerate,
        }
    }
}

/// String at a JSON pointer, or `MissingField` naming the pointer.
pub(crate) fn text_at(body: &Value, pointer: &'static str) -> Result<String, ExtractError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(ExtractError::MissingField(pointer))
}
