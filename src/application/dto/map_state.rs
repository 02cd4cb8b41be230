use chrono::{DateTime, Utc};
use serde::Serialize;

use super::LocationResponseDto;
use crate::domain::entities::{Decoration, MapState};
use crate::domain::value_objects::RunStatus;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationResponseDto {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub message: String,
}

impl From<Decoration> for DecorationResponseDto {
    fn from(d: Decoration) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name,
            image_url: d.image_url,
            x: d.x,
            y: d.y,
            rotation: d.rotation,
            scale: d.scale,
            message: d.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStateResponseDto {
    pub background_url: Option<String>,
    pub locations: Vec<LocationResponseDto>,
    pub decorations: Vec<DecorationResponseDto>,
    pub region_name: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl From<MapState> for MapStateResponseDto {
    fn from(m: MapState) -> Self {
        Self {
            background_url: m.background_url,
            locations: m
                .locations
                .into_iter()
                .map(LocationResponseDto::from)
                .collect(),
            decorations: m
                .decorations
                .into_iter()
                .map(DecorationResponseDto::from)
                .collect(),
            region_name: m.region_name,
            generated_at: m.generated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusResponseDto {
    pub status: RunStatus,
    pub error: Option<String>,
    pub run_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshotResponseDto {
    pub status: RunStatus,
    pub error: Option<String>,
    pub run_id: u64,
    pub selected_location: Option<LocationResponseDto>,
    pub map: MapStateResponseDto,
}
