use serde::{Deserialize, Serialize};

/// Body of `POST /api/query`: one prompt for one provider.
///
/// Both fields are optional on the wire so that a missing value is reported
/// as a `400 {error}` by the handler instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl QueryRequest {
    pub fn new<P: Into<String>, S: Into<String>>(prompt: P, provider: S) -> Self {
        Self { prompt: Some(prompt.into()), provider: Some(provider.into()) }
    }
}

/// Successful answer from one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct QueryResponse {
    pub response: String,
    pub model: String,
}

/// Error envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self { error: error.into() }
    }
}

/// Body of `POST /api/compare`: start a fan-out run over every provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CompareRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Acknowledgement for an accepted comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CompareAccepted {
    pub run_id: String,
}

/// Display metadata for one provider card (`GET /api/providers`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub model: String,
    pub color: String,
    pub icon: String,
}
