//! Value objects - Immutable objects defined by their attributes

mod character;
mod ids;
mod placement;
mod region;
mod run_status;

pub use character::{default_roster, CharacterDefinition};
pub use ids::*;
pub use placement::{
    decoration_anchor, spread_points, MapPoint, DECORATION_JITTER, LOCATION_MAX_COORD,
    LOCATION_MIN_COORD, MIN_SEPARATION,
};

#[cfg(test)]
pub use placement::all_separated;
pub use region::MapRegion;
pub use run_status::RunStatus;
