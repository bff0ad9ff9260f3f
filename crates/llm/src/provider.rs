use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::form_urlencoded;

use crate::adapters::AdapterKind;

/// The closed set of chat APIs the service compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    ChatGpt,
    Claude,
    Gemini,
    Grok,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::ChatGpt,
        ProviderId::Claude,
        ProviderId::Gemini,
        ProviderId::Grok,
        ProviderId::Perplexity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::ChatGpt => "chatgpt",
            ProviderId::Claude => "claude",
            ProviderId::Gemini => "gemini",
            ProviderId::Grok => "grok",
            ProviderId::Perplexity => "perplexity",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Where a provider's chat endpoint lives.
///
/// `{model}` in either template is replaced with the descriptor's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Fixed URL; the credential travels in a header.
    Static(String),
    /// The credential is appended as a `key` query parameter.
    KeyInQuery(String),
}

impl Endpoint {
    pub fn url(&self, model: &str, credential: &str) -> String {
        match self {
            Endpoint::Static(template) => template.replace("{model}", model),
            Endpoint::KeyInQuery(template) => {
                let base = template.replace("{model}", model);
                let sep = if base.contains('?') { '&' } else { '?' };
                let key: String = form_urlencoded::byte_serialize(credential.as_bytes()).collect();
                format!("{}{}key={}", base, sep, key)
            }
        }
    }
}

/// Static connection details for one provider.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub model: String,
    /// Environment variable holding the API key.
    pub credential: &'static str,
    /// Environment variable that overrides `model`.
    pub model_env: &'static str,
    pub endpoint: Endpoint,
    pub adapter: AdapterKind,
    pub color: &'static str,
    pub icon: &'static str,
}

impl ProviderDescriptor {
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn adapter(&self) -> &'static dyn crate::ProviderAdapter {
        self.adapter.adapter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_ids_case_insensitively() {
        assert_eq!("chatgpt".parse::<ProviderId>().unwrap(), ProviderId::ChatGpt);
        assert_eq!("Claude".parse::<ProviderId>().unwrap(), ProviderId::Claude);
        assert_eq!(" grok ".parse::<ProviderId>().unwrap(), ProviderId::Grok);
        assert_eq!(
            "llama".parse::<ProviderId>(),
            Err(UnknownProvider("llama".to_string()))
        );
    }

    #[test]
    fn serde_matches_as_str() {
        for id in ProviderId::ALL {
            let json = serde_json::to_value(id).unwrap();
            assert_eq!(json, serde_json::json!(id.as_str()));
        }
    }

    #[test]
    fn key_in_query_appends_credential() {
        let ep = Endpoint::KeyInQuery("https://g.example/models/{model}:generate".into());
        assert_eq!(ep.url("m1", "k"), "https://g.example/models/m1:generate?key=k");

        let ep = Endpoint::KeyInQuery("https://g.example/x?alt=json".into());
        assert_eq!(ep.url("m1", "k"), "https://g.example/x?alt=json&key=k");
    }

    #[test]
    fn key_in_query_is_percent_encoded() {
        let ep = Endpoint::KeyInQuery("https://g.example/models/{model}:generate".into());
        assert_eq!(
            ep.url("m1", "a&b#c+d=e f"),
            "https://g.example/models/m1:generate?key=a%26b%23c%2Bd%3De+f"
        );
    }

    #[test]
    fn static_endpoint_ignores_credential() {
        let ep = Endpoint::Static("https://api.example/v1/chat".into());
        assert_eq!(ep.url("m", "secret"), "https://api.example/v1/chat");
    }
}
