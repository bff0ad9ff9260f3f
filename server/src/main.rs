use anyhow::Result;
use chorus_server::{app, AppState, Settings};
use dotenvy::dotenv;
use llm::{Credentials, ProviderRegistry, ReqwestTransport};
use std::{env, net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env::var("RUST_LOG").unwrap_or_else(|_| {
            "chorus_server=info,orchestrator_core=info,llm=info,tower_http=debug".into()
        })))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let registry = Arc::new(ProviderRegistry::from_env());
    let credentials = Credentials::from_env(&registry);
    for descriptor in registry.iter() {
        if credentials.is_configured(descriptor.credential) {
            info!(provider = %descriptor.id, model = %descriptor.model, "provider configured");
        } else {
            warn!(provider = %descriptor.id, "{} not set; requests to it will fail", descriptor.credential);
        }
    }

    let transport = Arc::new(ReqwestTransport::new(settings.provider_timeout)?);
    let state = AppState::new(registry, credentials, transport);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Server listening on {}", addr);
    info!("Provider timeout: {:?}", settings.provider_timeout);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
