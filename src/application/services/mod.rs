//! Application services - Use case implementations
//!
//! The extraction, background and decoration services each own one kind of
//! generation request. The map generation service drives them through a run
//! and owns the resulting state.

pub mod background_synthesis_service;
pub mod decoration_service;
pub mod generation_error;
pub mod llm;
pub mod location_extraction_service;
pub mod map_generation_service;

#[cfg(test)]
mod test_support;

// Re-export map generation service types
pub use map_generation_service::{MapGenerationEvent, MapGenerationService, MapSnapshot};
