//! Location Extraction Service - Itinerary text to map markers
//!
//! The heavy lifting happens upstream: the prompt carries the extraction
//! policy and layout guidance, and the model answers with a JSON array. This
//! service turns that answer into domain locations and enforces the
//! guarantees the model cannot be trusted with:
//!
//! - every location gets a unique id, even when the model omits or repeats them
//! - coordinates are clamped into the marker band and spread apart

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use super::generation_error::GenerationError;
use super::llm::prompt_builder::{build_extraction_prompt, location_response_schema};
use crate::application::dto::ExtractedLocationDto;
use crate::application::ports::outbound::{ContentGenerationPort, StructuredRequest};
use crate::domain::entities::Location;
use crate::domain::value_objects::{spread_points, LocationId, MapPoint, MapRegion};

pub struct LocationExtractionService<G: ContentGenerationPort> {
    generator: Arc<G>,
    region: MapRegion,
}

impl<G: ContentGenerationPort> LocationExtractionService<G> {
    pub fn new(generator: Arc<G>, region: MapRegion) -> Self {
        Self { generator, region }
    }

    /// Extract the ordered marker list for an itinerary
    ///
    /// Any count the model returns is accepted. Fails only when there is no
    /// parsable payload.
    pub async fn extract(&self, itinerary: &str) -> Result<Vec<Location>, GenerationError> {
        let request = StructuredRequest::new(
            build_extraction_prompt(&self.region, itinerary),
            location_response_schema(),
        );

        let payload = self
            .generator
            .generate_structured(request)
            .await
            .map_err(|e| GenerationError::ExtractionFailure(e.to_string()))?
            .ok_or_else(|| {
                GenerationError::ExtractionFailure("No data returned from generator".to_string())
            })?;

        let entries = parse_locations(&payload)?;
        tracing::debug!(count = entries.len(), "Parsed extracted locations");

        Ok(build_locations(entries, Utc::now().timestamp_millis()))
    }
}

/// Parse the model's answer, tolerating a markdown code fence around it
pub fn parse_locations(payload: &str) -> Result<Vec<ExtractedLocationDto>, GenerationError> {
    let body = strip_code_fence(payload);
    if body.is_empty() {
        return Err(GenerationError::ExtractionFailure(
            "Empty payload returned from generator".to_string(),
        ));
    }
    serde_json::from_str(body)
        .map_err(|e| GenerationError::ExtractionFailure(format!("Unparsable payload: {}", e)))
}

fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn parsed entries into locations with unique ids and a valid layout
pub fn build_locations(entries: Vec<ExtractedLocationDto>, timestamp_millis: i64) -> Vec<Location> {
    let positions: Vec<MapPoint> = entries
        .iter()
        .map(|e| {
            MapPoint::new(
                e.x.unwrap_or(f64::NAN),
                e.y.unwrap_or(f64::NAN),
            )
        })
        .collect();
    let positions = spread_points(&positions);

    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());

    entries
        .into_iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (entry, position))| {
            let id = assign_id(entry.id.as_deref(), index, timestamp_millis, &mut seen);
            let tags = entry
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();

            Location::new(id, entry.name.trim(), position)
                .with_description(entry.description.trim())
                .with_emoji(entry.emoji.trim())
                .with_tags(tags)
        })
        .collect()
}

/// Keep the upstream id when it is present and unused, otherwise synthesize one
fn assign_id(
    upstream: Option<&str>,
    index: usize,
    timestamp_millis: i64,
    seen: &mut HashSet<String>,
) -> LocationId {
    if let Some(id) = upstream.map(str::trim).filter(|id| !id.is_empty()) {
        if seen.insert(id.to_string()) {
            return LocationId::new(id);
        }
        tracing::debug!(id, index, "Duplicate location id from generator, reassigning");
    }

    let base = format!("loc-{}-{}", index, timestamp_millis);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    LocationId::new(candidate)
}
