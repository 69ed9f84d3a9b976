//! HTTP server setup and shared state.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::selector::Selector;
use crate::upstream::UpstreamClient;

/// Shared application state: the composition root owns the upstream client
/// and hands a clone of this handle to every request.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<UpstreamClient>,
    pub selector: Arc<Selector>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let client = UpstreamClient::new(&config.upstream)?;
        let selector = Selector::new(
            config.upstream.selector_model.clone(),
            config.upstream.fallback_model.clone(),
        );

        Ok(Self {
            client: Arc::new(client),
            selector: Arc::new(selector),
            catalog: Arc::new(config.catalog()),
        })
    }
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/select-model", post(handlers::select_model))
        .route("/api/chat", post(handlers::chat))
        .route("/api/models", get(handlers::list_models))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    let state = AppState::from_config(&config)?;

    tracing::info!(
        upstream = %config.upstream.url,
        selector_model = %config.upstream.selector_model,
        fallback_model = %config.upstream.fallback_model,
        catalog_size = state.catalog.len(),
        "Configured upstream"
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting modelmux server");

    axum::serve(listener, app).await?;

    Ok(())
}
