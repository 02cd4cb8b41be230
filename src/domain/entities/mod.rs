//! Domain entities - Core business objects with identity

mod decoration;
mod location;
mod map_state;

pub use decoration::Decoration;
pub use location::Location;
pub use map_state::MapState;
