//! Tokidex Backend
//!
//! A small REST backend managing a collection of Tokimon cards persisted to a JSON file.

mod api;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tokidex Backend");
    tracing::info!("Card file: {:?}", config.data_path);
    tracing::info!("Images directory: {:?}", config.images_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.reset_on_start {
        tracing::warn!("TOKIDEX_RESET_ON_START is set: existing cards will be replaced by the seed set");
    }

    // Initialize card store
    let store = db::init_store(&config.data_path, config.reset_on_start).await?;
    tracing::info!(
        "Card store ready at {:?} with {} cards",
        store.path(),
        store.total().await
    );

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let card_routes = Router::new()
        .route("/cards", get(api::list_cards).post(api::create_card))
        .route(
            "/cards/{id}",
            get(api::get_card)
                .put(api::update_card)
                .delete(api::delete_card),
        )
        .route("/cards/photo", post(api::upload_photo).layer(upload_limit))
        .route("/cards/photos/{filename}", get(api::get_photo));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(card_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
