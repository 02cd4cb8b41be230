//! HTTP REST API routes

mod map_routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/map", get(map_routes::get_map))
        .route("/api/map/generate", post(map_routes::generate_map))
        .route("/api/map/status", get(map_routes::get_status))
        .route(
            "/api/map/selection",
            put(map_routes::select_location).delete(map_routes::clear_selection),
        )
        .route(
            "/api/map/locations/{id}/link",
            get(map_routes::get_location_link),
        )
}
