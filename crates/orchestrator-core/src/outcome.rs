use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a provider query failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPrompt,
    UnknownProvider,
    /// Carries the name of the missing credential.
    MissingCredential(String),
    MalformedResponse,
    Transport,
    Unauthorized,
    PaymentRequired,
    BillingRequired,
    RateLimited,
    ModelNotFound,
    /// Any other non-success upstream status.
    Upstream(u16),
}

impl ErrorKind {
    /// Status the inbound `/api/query` endpoint answers with.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidPrompt | ErrorKind::UnknownProvider => 400,
            ErrorKind::MissingCredential(_) | ErrorKind::MalformedResponse | ErrorKind::Transport => 500,
            ErrorKind::Unauthorized => 401,
            ErrorKind::PaymentRequired => 402,
            ErrorKind::BillingRequired => 403,
            ErrorKind::ModelNotFound => 404,
            ErrorKind::RateLimited => 429,
            ErrorKind::Upstream(status) => *status,
        }
    }
}

/// A classified failure with a message safe to show to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct QueryFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl QueryFailure {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self { kind, message: message.into() }
    }
}

/// Normalized result of one dispatcher call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    Success { text: String, model: String },
    Failure(QueryFailure),
}

impl QueryOutcome {
    pub fn success<T: Into<String>, M: Into<String>>(text: T, model: M) -> Self {
        QueryOutcome::Success { text: text.into(), model: model.into() }
    }

    pub fn failure<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        QueryOutcome::Failure(QueryFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            QueryOutcome::Success { text, .. } => Some(text),
            QueryOutcome::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<&ErrorKind> {
        match self {
            QueryOutcome::Success { .. } => None,
            QueryOutcome::Failure(f) => Some(&f.kind),
        }
    }
}
