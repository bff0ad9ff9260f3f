use serde_json::{json, Value};

use super::{text_at, ExtractError, ProviderAdapter};
use crate::provider::ProviderDescriptor;
use crate::transport::OutboundRequest;

/// OpenAI-compatible Chat Completions.
pub struct OpenAiChat;

impl ProviderAdapter for OpenAiChat {
    fn build_request(
        &self,
        descriptor: &ProviderDescriptor,
        prompt: &str,
        credential: &str,
    ) -> OutboundRequest {
        let body = json!({
            "model": descriptor.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        OutboundRequest::new(descriptor.endpoint.url(&descriptor.model, credential), body)
            .header("Authorization", format!("Bearer {}", credential))
    }

    fn extract_text(&self, body: &Value) -> Result<String, ExtractError> {
        text_at(body, "/choices/0/message/content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builtin_descriptor;
    use crate::ProviderId;

    #[test]
    fn builds_bearer_request() {
        let d = builtin_descriptor(ProviderId::Grok);
        let req = OpenAiChat.build_request(&d, "hello", "xai-key");
        assert_eq!(req.url, "https://api.x.ai/v1/chat/completions");
        assert_eq!(req.header_value("Authorization"), Some("Bearer xai-key"));
        assert_eq!(req.body["model"], "grok-beta");
        assert_eq!(req.body["messages"][0]["content"], "hello");
    }

    #[test]
    fn extracts_first_choice() {
        let body = json!({ "choices": [{ "message": { "role": "assistant", "content": "hi there" } }] });
        assert_eq!(OpenAiChat.extract_text(&body).unwrap(), "hi there");
    }

    #[test]
    fn empty_choices_is_missing_field() {
        let body = json!({ "choices": [] });
        assert_eq!(
            OpenAiChat.extract_text(&body),
            Err(ExtractError::MissingField("/choices/0/message/content"))
        );
    }
}
