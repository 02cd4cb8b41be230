//! MapState - The render-ready result of a generation run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Decoration, Location};
use crate::domain::value_objects::LocationId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    /// `None` until a background has been generated
    pub background_url: Option<String>,
    /// Extraction order
    pub locations: Vec<Location>,
    pub decorations: Vec<Decoration>,
    pub region_name: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl MapState {
    pub fn find_location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| &l.id == id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.background_url.is_none() && self.locations.is_empty() && self.decorations.is_empty()
    }
}
