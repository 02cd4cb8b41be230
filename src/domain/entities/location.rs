//! Location entity - A point of interest extracted from the itinerary

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LocationId, MapPoint};

const MAP_SEARCH_ENDPOINT: &str = "https://www.google.com/maps/search/";

/// A marker on the travel map
///
/// Locations are created as a batch by the extractor and never mutated
/// afterwards; the next run replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Short narrative blurb in the map's voice
    pub description: String,
    /// Single glyph classifying the stop
    pub emoji: String,
    pub x: f64,
    pub y: f64,
    pub tags: Vec<String>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, position: MapPoint) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            emoji: String::new(),
            x: position.x,
            y: position.y,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[cfg(test)]
    pub fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }

    /// External map search link for this stop, derived from its name only
    pub fn map_search_url(&self) -> anyhow::Result<String> {
        map_search_url(&self.name)
    }
}

/// Build a map search deep link for an arbitrary place name
pub fn map_search_url(query: &str) -> anyhow::Result<String> {
    let url = Url::parse_with_params(MAP_SEARCH_ENDPOINT, &[("api", "1"), ("query", query)])
        .map_err(|e| anyhow::anyhow!("Invalid map search URL for {:?}: {}", query, e))?;
    Ok(url.into())
}
