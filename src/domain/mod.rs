//! Domain layer - Core map model with no I/O
//!
//! This layer contains:
//! - Entities: Location, Decoration, MapState
//! - Value Objects: ids, placement model, region profile, character roster, run status
//! - Aggregates: MapSession, the owner of map and progress state

pub mod aggregates;
pub mod entities;
pub mod value_objects;
