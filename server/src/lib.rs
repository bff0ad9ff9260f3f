pub mod config;
mod routes;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use llm::{Credentials, HttpTransport, ProviderRegistry};
use orchestrator_core::{Coordinator, Dispatcher};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub coordinator: Coordinator<Dispatcher>,
}

impl AppState {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Credentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry), credentials, transport));
        let coordinator = Coordinator::new(Arc::clone(&dispatcher), Arc::clone(&registry));
        Self { registry, dispatcher, coordinator }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/query", post(routes::query))
        .route("/api/providers", get(routes::providers))
        .route("/api/compare", post(routes::start_compare).get(routes::current_compare))
        .route("/health", get(routes::health_check))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
