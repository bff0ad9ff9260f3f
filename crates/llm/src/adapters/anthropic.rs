use serde_json::{json, Value};

use super::{text_at, ExtractError, ProviderAdapter};
use crate::provider::ProviderDescriptor;
use crate::transport::OutboundRequest;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic Messages API.
pub struct AnthropicMessages;

impl ProviderAdapter for AnthropicMessages {
    fn build_request(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        credential: &str,
    ) -> OutboundRequest {
        let body = json!({
            "model": descriptor.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }],
        });
        OutboundRequest::new(descriptor.endpoint.url(&descriptor.model, credential), body)
            .header("x-api-key", credential)
            .header("anthropic-version", ANTHROPIC_VERSION)
    }

    fn extract_text(&self, body: &Value) -> Result<String, ExtractError> {
        text_at(body, "/content/0/text")
    }
}
