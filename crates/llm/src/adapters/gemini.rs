use serde_json::{json, Value};

use super::{text_at, ExtractError, ProviderAdapter};
use crate::provider::ProviderDescriptor;
use crate::transport::OutboundRequest;

/// Google `generateContent`. The key rides in the URL.
pub struct GeminiGenerate;

impl ProviderAdapter for GeminiGenerate {
    fn build_request(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        credential: &str,
    ) -> OutboundRequest {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        OutboundRequest::new(descriptor.endpoint.url(&descriptor.model, credential), body)
    }

    fn extract_text(&self, body: &Value) -> Result<String, ExtractError> {
        text_at(body, "/candidates/0/content/parts/0/text")
    }

    fn extract_model(&self, body: &Value) -> Option<String> {
        body.get("modelVersion").and_then(Value::as_str).map(String::from)
    }
}
