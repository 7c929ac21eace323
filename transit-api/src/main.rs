use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transit_api::{app, AppState};
use transit_catalog::InMemoryCatalog;
use transit_core::SimulatedBackend;
use transit_store::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_api=debug,transit_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting transit API on port {}", config.server.port);

    let backend = SimulatedBackend::new(config.booking.submission_delay())
        .failing(config.booking.simulate_failure);
    if config.booking.simulate_failure {
        tracing::warn!("Booking service will fail every submission");
    }

    let app_state = AppState::new(
        InMemoryCatalog::pune(),
        Arc::new(backend),
        config.booking.submission_timeout(),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
