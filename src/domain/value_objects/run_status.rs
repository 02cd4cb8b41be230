//! Progress state of a map generation run

use serde::{Deserialize, Serialize};

/// ```text
/// Idle -> ExtractingLocations -> SynthesizingAssets -> Ready
///               |                       |
///               +--------> Error <------+
/// ```
///
/// `Ready` and `Error` are resting states; a new run re-enters
/// `ExtractingLocations` from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    ExtractingLocations,
    SynthesizingAssets,
    Ready,
    Error,
}

impl RunStatus {
    /// Whether a new run may start from this state
    pub fn is_resting(&self) -> bool {
        matches!(self, Self::Idle | Self::Ready | Self::Error)
    }

    pub fn is_generating(&self) -> bool {
        !self.is_resting()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::ExtractingLocations => write!(f, "extracting_locations"),
            RunStatus::SynthesizingAssets => write!(f, "synthesizing_assets"),
            RunStatus::Ready => write!(f, "ready"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}
