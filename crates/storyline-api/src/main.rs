//! Storyline API server entry point.

use std::sync::Arc;

use storyline_api::config::AppConfig;
use storyline_api::error::AppError;
use storyline_api::state::AppState;
use storyline_core::clock::{MonotonicClock, SystemClock};
use storyline_core::rng::OsSeededRng;
use storyline_store::{DurableMap, StoreConfig};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storyline API server");

    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    // Open the story log, dropping superseded records left by earlier runs.
    if let Some(parent) = config.data_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = DurableMap::open(&config.data_path, StoreConfig::default())?;
    if store.stale_records() > 0 {
        store.compact()?;
    }

    // Build application state.
    let app_state = AppState::new(
        Box::new(store),
        Arc::new(MonotonicClock::new(SystemClock)),
        Box::new(OsSeededRng::new()),
    );

    // Build router.
    let app = storyline_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
