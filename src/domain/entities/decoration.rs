//! Decoration entity - A character sticker overlaid on the map

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DecorationId;

/// Decorations ignore the marker separation rules and may overlap anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: DecorationId,
    pub name: String,
    /// Reference to the generated sticker image
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    /// Tilt in degrees
    pub rotation: f64,
    pub scale: f64,
    /// Caption shown in the speech bubble
    pub message: String,
}
