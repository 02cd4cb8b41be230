//! Aggregates - Cluster of domain objects treated as a single unit

pub mod map_session;

pub use map_session::{AssetBundle, MapSession, MapSessionError};
