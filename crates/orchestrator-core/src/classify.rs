//! Turning a provider's non-success reply into a user-facing failure.

use llm::ProviderDescriptor;
use serde_json::Value;

use crate::outcome::{ErrorKind, QueryFailure};

/// Raw error bodies up to this many characters are shown as-is.
pub const RAW_BODY_LIMIT: usize = 200;

/// Status code to failure kind.
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Unauthorized,
        402 => ErrorKind::PaymentRequired,
        403 => ErrorKind::BillingRequired,
        404 => ErrorKind::ModelNotFound,
        429 => ErrorKind::RateLimited,
        other => ErrorKind::Upstream(other),
    }
}

/// Human-readable detail from an error body: a structured message when the
/// body is JSON that carries one, the raw body when short, else a generic line.
pub fn error_detail(body: &str, model: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = structured_message(&json) {
            return msg;
        }
    }

    let raw = body.trim();
    if !raw.is_empty() && raw.chars().count() <= RAW_BODY_LIMIT {
        raw.to_string()
    } else {
        format!("{} error ({})", model, status)
    }
}

fn structured_message(json: &Value) -> Option<String> {
    ["/error/message", "/error", "/message", "/detail"]
        .iter()
        .filter_map(|p| json.pointer(p))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Classify an upstream failure and phrase it for the provider's card.
pub fn upstream_failure(descriptor: &ProviderDescriptor, status: u16, body: &str) -> QueryFailure {
    let kind = classify_status(status);
    let name = descriptor.display_name;
    let message = match &kind {
        ErrorKind::Unauthorized => {
            format!("Invalid API key for {}. Check your {}.", name, descriptor.credential)
        }
        ErrorKind::PaymentRequired => {
            format!("{} requires payment. Add credits to your account.", name)
        }
        ErrorKind::BillingRequired => {
            format!("{} denied access. Billing may need to be enabled for this key.", name)
        }
        ErrorKind::ModelNotFound => {
            format!("{} model \"{}\" was not found.", name, descriptor.model)
        }
        ErrorKind::RateLimited => {
            format!("{} rate limit reached. Wait a moment and try again.", name)
        }
        _ => format!("{}: {}", name, error_detail(body, &descriptor.model, status)),
    };
    QueryFailure { kind, message }
}
