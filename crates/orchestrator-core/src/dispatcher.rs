use async_trait::async_trait;
use llm::{Credentials, HttpTransport, ProviderDescriptor, ProviderRegistry};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::classify;
use crate::outcome::{ErrorKind, QueryFailure, QueryOutcome};
use crate::ports::QueryPort;

/// Performs one provider call end to end and owns every failure decision.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    credentials: Credentials,
    transport: Arc<dyn HttpTransport>,
}

/// A failure plus the raw detail that only goes to the log.
struct Rejection {
    failure: QueryFailure,
    detail: String,
}

impl Rejection {
    fn new<D: Into<String>>(kind: ErrorKind, message: String, detail: D) -> Self {
        Self { failure: QueryFailure { kind, message }, detail: detail.into() }
    }
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Credentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self { registry, credentials, transport }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    async fn run(&self, prompt: &str, provider: &str) -> Result<(String, String), Rejection> {
        if prompt.trim().is_empty() {
            return Err(Rejection::new(
                ErrorKind::InvalidPrompt,
                "Prompt must not be empty.".into(),
                "empty prompt",
            ));
        }

        let descriptor = self.registry.lookup(provider).map_err(|e| {
            Rejection::new(ErrorKind::UnknownProvider, format!("Unknown provider: {}", provider), e.to_string())
        })?;

        let credential = self.credentials.get(descriptor.credential).ok_or_else(|| {
            Rejection::new(
                ErrorKind::MissingCredential(descriptor.credential.to_string()),
                format!("{} is not configured. Set {}.", descriptor.display_name, descriptor.credential),
                format!("{} not set", descriptor.credential),
            )
        })?;

        let adapter = descriptor.adapter();
        let request = adapter.build_request(descriptor, prompt, credential);

        let response = self.transport.post_json(request).await.map_err(|e| {
            Rejection::new(
                ErrorKind::Transport,
                format!("{} request failed: {}", descriptor.display_name, e),
                e.to_string(),
            )
        })?;

        if !response.is_success() {
            let failure = classify::upstream_failure(descriptor, response.status, &response.body);
            return Err(Rejection {
                failure,
                detail: format!("status {}: {}", response.status, response.body),
            });
        }

        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| malformed(descriptor, format!("invalid json: {}", e)))?;
        let text = adapter
            .extract_text(&body)
            .map_err(|e| malformed(descriptor, e.to_string()))?;
        let model = adapter
            .extract_model(&body)
            .unwrap_or_else(|| descriptor.model.clone());

        Ok((text, model))
    }
}

fn malformed(descriptor: &ProviderDescriptor, detail: String) -> Rejection {
    Rejection::new(
        ErrorKind::MalformedResponse,
        format!("{} returned an unexpected response.", descriptor.display_name),
        detail,
    )
}

#[async_trait]
impl QueryPort for Dispatcher {
    async fn dispatch(&self, prompt: &str, provider: &str) -> QueryOutcome {
        match self.run(prompt, provider).await {
            Ok((text, model)) => QueryOutcome::Success { text, model },
            Err(Rejection { failure, detail }) => {
                warn!(provider = %provider, kind = ?failure.kind, detail = %detail, "provider query failed");
                QueryOutcome::Failure(failure)
            }
        }
    }
}
