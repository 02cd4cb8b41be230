//! Map Session Aggregate - The single owner of map and progress state
//!
//! Every change to the visible map goes through one of the transition methods
//! below. Each generation run is stamped with a [`RunId`]; a transition from a
//! run that is no longer the latest one issued is rejected, so the results of a
//! superseded run can never overwrite those of a newer run.

use chrono::{DateTime, Utc};

use crate::domain::entities::{Decoration, Location, MapState};
use crate::domain::value_objects::{LocationId, RunId, RunStatus};

/// Results of the asset fan-out, applied together on success
#[derive(Debug, Clone)]
pub struct AssetBundle {
    pub background_url: String,
    pub decorations: Vec<Decoration>,
    pub region_name: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MapSession {
    status: RunStatus,
    /// What the renderer sees right now
    map: MapState,
    /// Map produced by the last successful run
    committed: MapState,
    error: Option<String>,
    selected_location: Option<LocationId>,
    latest_run: RunId,
}

impl MapSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn map(&self) -> &MapState {
        &self.map
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_location(&self) -> Option<&Location> {
        self.selected_location
            .as_ref()
            .and_then(|id| self.map.find_location(id))
    }

    pub fn latest_run(&self) -> RunId {
        self.latest_run
    }

    pub fn is_current(&self, run: RunId) -> bool {
        run == self.latest_run
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Any state -> ExtractingLocations
    ///
    /// Clears the error, the decoration set and the selection. Locations and
    /// background stay visible until the new run replaces them.
    pub fn begin_run(&mut self) -> RunId {
        self.latest_run = self.latest_run.next();
        self.status = RunStatus::ExtractingLocations;
        self.error = None;
        self.selected_location = None;
        self.map.decorations.clear();
        self.latest_run
    }

    /// ExtractingLocations -> SynthesizingAssets
    pub fn record_locations(
        &mut self,
        run: RunId,
        locations: Vec<Location>,
    ) -> Result<(), MapSessionError> {
        self.check_transition(run, RunStatus::ExtractingLocations, RunStatus::SynthesizingAssets)?;
        self.map.locations = locations;
        self.status = RunStatus::SynthesizingAssets;
        Ok(())
    }

    /// SynthesizingAssets -> Ready
    pub fn record_assets(&mut self, run: RunId, assets: AssetBundle) -> Result<(), MapSessionError> {
        self.check_transition(run, RunStatus::SynthesizingAssets, RunStatus::Ready)?;
        self.map.background_url = Some(assets.background_url);
        self.map.decorations = assets.decorations;
        self.map.region_name = assets.region_name;
        self.map.generated_at = Some(assets.generated_at);
        self.committed = self.map.clone();
        self.status = RunStatus::Ready;
        Ok(())
    }

    /// ExtractingLocations | SynthesizingAssets -> Error
    ///
    /// The visible map rolls back to the last successful run so the user never
    /// sees a half-populated map.
    pub fn record_failure(
        &mut self,
        run: RunId,
        message: impl Into<String>,
    ) -> Result<(), MapSessionError> {
        if !self.is_current(run) {
            return Err(MapSessionError::StaleRun {
                run,
                latest: self.latest_run,
            });
        }
        if !self.status.is_generating() {
            return Err(MapSessionError::InvalidTransition {
                from: self.status,
                to: RunStatus::Error,
            });
        }
        self.map = self.committed.clone();
        self.error = Some(message.into());
        self.status = RunStatus::Error;
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_location(&mut self, id: LocationId) -> Result<&Location, MapSessionError> {
        if self.map.find_location(&id).is_none() {
            return Err(MapSessionError::UnknownLocation(id));
        }
        self.selected_location = Some(id.clone());
        self.map
            .find_location(&id)
            .ok_or(MapSessionError::UnknownLocation(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected_location = None;
    }

    fn check_transition(
        &self,
        run: RunId,
        expected: RunStatus,
        to: RunStatus,
    ) -> Result<(), MapSessionError> {
        if !self.is_current(run) {
            return Err(MapSessionError::StaleRun {
                run,
                latest: self.latest_run,
            });
        }
        if self.status != expected {
            return Err(MapSessionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapSessionError {
    #[error("{run} was superseded by {latest}")]
    StaleRun { run: RunId, latest: RunId },
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },
    #[error("Location not on the current map: {0}")]
    UnknownLocation(LocationId),
}
