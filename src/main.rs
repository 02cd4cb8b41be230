//! Itinerary Map Engine - Backend API for illustrated trip maps
//!
//! The Engine is the backend server that:
//! - Extracts map markers from free-text itineraries with Gemini
//! - Generates the illustrated background and the character stickers
//! - Serves the resulting map state and progress over REST

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::MapGenerationEvent;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itinerary_map_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Itinerary Map Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Gemini: {}", config.gemini_base_url);
    tracing::info!("  Text model: {}", config.gemini_text_model);
    tracing::info!("  Image model: {}", config.gemini_image_model);

    // Initialize application state
    let (events_tx, events_rx) = unbounded_channel();
    let state = Arc::new(AppState::new(config, events_tx)?);
    tracing::info!("Application state initialized");

    let event_logger = tokio::spawn(log_generation_events(events_rx));

    if state.config.generate_on_startup {
        match state.spawn_generation("").await {
            Some(run) => tracing::info!(%run, "Generating sample map on startup"),
            None => {
                let status = state.map_service.status().await;
                tracing::warn!(%status, "Startup generation skipped, a run is already in flight");
            }
        }
    }

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            event_logger.abort();
        }
    }

    Ok(())
}

async fn log_generation_events(mut events: UnboundedReceiver<MapGenerationEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            MapGenerationEvent::RunStarted { run } => {
                tracing::debug!(%run, "event: run started");
            }
            MapGenerationEvent::LocationsExtracted {
                run,
                location_count,
            } => {
                tracing::debug!(%run, location_count, "event: locations extracted");
            }
            MapGenerationEvent::AssetsReady {
                run,
                decoration_count,
            } => {
                tracing::debug!(%run, decoration_count, "event: assets ready");
            }
            MapGenerationEvent::RunFailed { run, error } => {
                tracing::debug!(%run, %error, "event: run failed");
            }
            MapGenerationEvent::StaleResultDiscarded { run, latest } => {
                tracing::debug!(%run, %latest, "event: stale result discarded");
            }
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
