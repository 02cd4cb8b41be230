//! Data transfer objects - wire shapes for the generator and the HTTP API

mod location;
mod map_state;

pub use location::{ExtractedLocationDto, LocationLinkResponseDto, LocationResponseDto};
pub use map_state::{MapSnapshotResponseDto, MapStateResponseDto, RunStatusResponseDto};
