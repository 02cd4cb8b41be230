//! Errors surfaced by a map generation run

use crate::domain::value_objects::RunId;

/// Failures of the mandatory generation path.
///
/// Character sticker failures never show up here; the decoration service
/// absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The itinerary could not be turned into locations
    #[error("Location extraction failed: {0}")]
    ExtractionFailure(String),
    /// No background image came back
    #[error("Background synthesis failed: {0}")]
    BackgroundSynthesisFailure(String),
    /// A newer run was started before this one finished; its results were dropped
    #[error("{0} was superseded by a newer run")]
    Superseded(RunId),
}

impl GenerationError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded(_))
    }
}
