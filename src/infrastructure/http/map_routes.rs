//! Map API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::dto::{
    LocationLinkResponseDto, LocationResponseDto, MapSnapshotResponseDto, MapStateResponseDto,
    RunStatusResponseDto,
};
use crate::application::services::MapSnapshot;
use crate::domain::aggregates::MapSessionError;
use crate::domain::value_objects::{LocationId, RunStatus};
use crate::infrastructure::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateMapRequest {
    /// Free-text itinerary; blank means the sample itinerary
    #[serde(default)]
    pub itinerary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMapResponse {
    pub run_id: u64,
    pub status: RunStatus,
}

#[derive(Debug, Deserialize)]
pub struct SelectLocationRequest {
    pub location_id: String,
}

impl From<MapSnapshot> for MapSnapshotResponseDto {
    fn from(s: MapSnapshot) -> Self {
        Self {
            status: s.status,
            error: s.error,
            run_id: s.run.value(),
            selected_location: s.selected_location.map(LocationResponseDto::from),
            map: MapStateResponseDto::from(s.map),
        }
    }
}

/// Start a generation run
pub async fn generate_map(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateMapRequest>,
) -> Result<(StatusCode, Json<GenerateMapResponse>), (StatusCode, String)> {
    let run = state
        .spawn_generation(&req.itinerary)
        .await
        .ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                "A map is already being generated".to_string(),
            )
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateMapResponse {
            run_id: run.value(),
            status: RunStatus::ExtractingLocations,
        }),
    ))
}

/// Get the current map, progress and selection
pub async fn get_map(State(state): State<Arc<AppState>>) -> Json<MapSnapshotResponseDto> {
    Json(state.map_service.snapshot().await.into())
}

/// Get progress only
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunStatusResponseDto> {
    let snapshot = state.map_service.snapshot().await;
    Json(RunStatusResponseDto {
        status: snapshot.status,
        error: snapshot.error,
        run_id: snapshot.run.value(),
    })
}

/// Select a location on the current map
pub async fn select_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectLocationRequest>,
) -> Result<Json<LocationResponseDto>, (StatusCode, String)> {
    let location = state
        .map_service
        .select_location(LocationId::new(req.location_id))
        .await
        .map_err(session_error)?;

    Ok(Json(LocationResponseDto::from(location)))
}

/// Clear the selection
pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.map_service.clear_selection().await;
    StatusCode::NO_CONTENT
}

/// External map search link for a location on the current map
pub async fn get_location_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LocationLinkResponseDto>, (StatusCode, String)> {
    let id = LocationId::new(id);
    let snapshot = state.map_service.snapshot().await;
    let location = snapshot
        .map
        .find_location(&id)
        .ok_or_else(|| session_error(MapSessionError::UnknownLocation(id.clone())))?;

    let url = location
        .map_search_url()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(LocationLinkResponseDto {
        id: location.id.to_string(),
        name: location.name.clone(),
        url,
    }))
}

fn session_error(e: MapSessionError) -> (StatusCode, String) {
    match e {
        MapSessionError::UnknownLocation(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => (StatusCode::CONFLICT, e.to_string()),
    }
}
