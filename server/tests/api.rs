use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chorus_server::{app, AppState};
use llm::transport::mock::StaticTransport;
use llm::{Credentials, ProviderRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn state_with(transport: Arc<StaticTransport>) -> AppState {
    let registry = Arc::new(ProviderRegistry::builtin());
    let credentials = Credentials::from_lookup(&registry, |name| {
        (name != "PERPLEXITY_API_KEY").then(|| format!("key-{}", name))
    });
    AppState::new(registry, credentials, transport)
}

fn chat(content: &str) -> Value {
    json!({ "model": "gpt-4o-mini", "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn query_returns_response_and_model() {
    let transport = Arc::new(StaticTransport::new().with_json(200, chat("Quicksort partitions around a pivot.")));
    let router = app(state_with(transport));

    let (status, body) = send(
        router,
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "Explain quicksort", "provider": "chatgpt" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Quicksort partitions around a pivot.", "model": "gpt-4o-mini" }));
}

#[tokio::test]
async fn query_rejects_bad_input_with_400() {
    let transport = Arc::new(StaticTransport::new());
    let state = state_with(Arc::clone(&transport));

    let (status, body) = send(app(state.clone()), Method::POST, "/api/query", Some(json!({ "prompt": "hi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Provider is required.");

    let (status, body) = send(
        app(state.clone()),
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "hi", "provider": "bard" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown provider: bard");

    let (status, body) = send(
        app(state.clone()),
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "  ", "provider": "claude" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt must not be empty.");

    let (status, _) = send(app(state), Method::POST, "/api/query", Some(json!("not an object"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn missing_credential_is_a_500() {
    let transport = Arc::new(StaticTransport::new());
    let router = app(state_with(Arc::clone(&transport)));

    let (status, body) = send(
        router,
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "hi", "provider": "perplexity" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Perplexity is not configured. Set PERPLEXITY_API_KEY.");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn upstream_status_passes_through() {
    let transport = Arc::new(
        StaticTransport::new()
            .with_json(429, json!({ "error": { "message": "slow down" } }))
            .with_json(402, json!({ "error": "insufficient credits" })),
    );
    let state = state_with(transport);

    let (status, body) = send(
        app(state.clone()),
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "hi", "provider": "grok" })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Grok rate limit reached. Wait a moment and try again.");

    let (status, body) = send(
        app(state),
        Method::POST,
        "/api/query",
        Some(json!({ "prompt": "hi", "provider": "chatgpt" })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "ChatGPT requires payment. Add credits to your account.");
}

#[tokio::test]
async fn providers_lists_registry_in_order() {
    let router = app(state_with(Arc::new(StaticTransport::new())));
    let (status, body) = send(router, Method::GET, "/api/providers", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["chatgpt", "claude", "gemini", "grok", "perplexity"]);
    assert_eq!(body[1]["name"], "Claude");
    assert_eq!(body[1]["model"], "claude-3-5-sonnet-20241022");
    assert_eq!(body[0]["color"], "#10a37f");
}

#[tokio::test]
async fn compare_runs_in_the_background() {
    let transport = Arc::new(
        StaticTransport::new()
            .on("api.openai.com", 200, chat("chatgpt answer"))
            .on("api.openai.com", 200, chat("the summary"))
            .on("api.anthropic.com", 200, json!({ "content": [{ "type": "text", "text": "claude answer" }] }))
            .on("generativelanguage.googleapis.com", 500, json!({ "error": { "message": "backend error" } }))
            .on("api.x.ai", 200, chat("grok answer")),
    );
    let state = state_with(transport);

    let (status, body) = send(app(state.clone()), Method::GET, "/api/compare", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(app(state.clone()), Method::POST, "/api/compare", Some(json!({ "prompt": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt must not be empty.");

    let (status, body) = send(
        app(state.clone()),
        Method::POST,
        "/api/compare",
        Some(json!({ "prompt": "Explain quicksort" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let run_id = body["runId"].as_str().unwrap().to_string();

    let mut rx = state.coordinator.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.as_ref().is_some_and(|run| run.is_settled())),
    )
    .await
    .unwrap()
    .unwrap();

    let (status, body) = send(app(state), Method::GET, "/api/compare", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["runId"], run_id.as_str());
    assert_eq!(body["prompt"], "Explain quicksort");
    assert_eq!(body["providers"][1]["status"]["state"], "succeeded");
    assert_eq!(body["providers"][2]["status"]["state"], "failed");
    assert_eq!(body["providers"][2]["status"]["message"], "Gemini: backend error");
    assert_eq!(body["providers"][4]["status"]["kind"]["kind"], "missing_credential");
    assert_eq!(body["summary"], json!({ "state": "done", "text": "the summary" }));
}

#[tokio::test]
async fn health_reports_ok() {
    let router = app(state_with(Arc::new(StaticTransport::new())));
    let (status, body) = send(router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}
