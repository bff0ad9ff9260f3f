use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orchestrator_core::{QueryOutcome, QueryPort};
use protocol::{CompareAccepted, CompareRequest, ErrorBody, ProviderInfo, QueryRequest, QueryResponse};
use serde_json::json;
use tracing::{info, warn};

use crate::AppState;

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

pub async fn query(
    Extension(state): Extension<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "rejected query body");
            return error(StatusCode::BAD_REQUEST, "Request body must be JSON with prompt and provider.");
        }
    };
    let Some(provider) = req.provider.filter(|p| !p.trim().is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "Provider is required.");
    };
    let prompt = req.prompt.unwrap_or_default();

    match state.dispatcher.dispatch(&prompt, &provider).await {
        QueryOutcome::Success { text, model } => {
            (StatusCode::OK, Json(QueryResponse { response: text, model })).into_response()
        }
        QueryOutcome::Failure(failure) => {
            let status = StatusCode::from_u16(failure.kind.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error(status, failure.message)
        }
    }
}

pub async fn providers(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let list: Vec<ProviderInfo> = state
        .registry
        .iter()
        .map(|d| ProviderInfo {
            id: d.id.to_string(),
            name: d.display_name.to_string(),
            model: d.model.clone(),
            color: d.color.to_string(),
            icon: d.icon.to_string(),
        })
        .collect();
    Json(list)
}

pub async fn start_compare(
    Extension(state): Extension<AppState>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> Response {
    let prompt = match body {
        Ok(Json(req)) => req.prompt.unwrap_or_default(),
        Err(rejection) => {
            warn!(error = %rejection, "rejected compare body");
            return error(StatusCode::BAD_REQUEST, "Request body must be JSON with a prompt.");
        }
    };

    match state.coordinator.start_comparison(&prompt) {
        Some(run_id) => {
            info!(run = %run_id, "comparison accepted");
            (StatusCode::ACCEPTED, Json(CompareAccepted { run_id: run_id.to_string() })).into_response()
        }
        None => error(StatusCode::BAD_REQUEST, "Prompt must not be empty."),
    }
}

pub async fn current_compare(Extension(state): Extension<AppState>) -> Response {
    match state.coordinator.snapshot() {
        Some(run) => (StatusCode::OK, Json(run)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
