use serde::{Deserialize, Serialize};

use crate::domain::entities::Location;

/// One entry of the extractor's structured answer.
///
/// Every field is optional on the wire; the model is not guaranteed to fill
/// them all in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedLocationDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponseDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub x: f64,
    pub y: f64,
    pub tags: Vec<String>,
    pub map_search_url: Option<String>,
}

impl From<Location> for LocationResponseDto {
    fn from(l: Location) -> Self {
        let map_search_url = l.map_search_url().ok();
        Self {
            id: l.id.to_string(),
            name: l.name,
            description: l.description,
            emoji: l.emoji,
            x: l.x,
            y: l.y,
            tags: l.tags,
            map_search_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLinkResponseDto {
    pub id: String,
    pub name: String,
    pub url: String,
}
