use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, AppState};
use crate::config::GeoAlertConfig;

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health))
        .nest("/api", api::router())
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
}

pub async fn run(config: GeoAlertConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let state = Arc::new(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("GeoAlert API listening on http://{}", addr);

    axum::serve(listener, app(state))
        .await
        .context("Server terminated unexpectedly")?;
    Ok(())
}
