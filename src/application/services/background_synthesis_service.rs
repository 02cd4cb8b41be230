//! Background Synthesis Service - The illustrated map canvas

use std::sync::Arc;

use super::generation_error::GenerationError;
use super::llm::prompt_builder::build_background_prompt;
use crate::application::ports::outbound::{AspectRatio, ContentGenerationPort, ImageRequest};
use crate::domain::value_objects::MapRegion;

pub struct BackgroundSynthesisService<G: ContentGenerationPort> {
    generator: Arc<G>,
    region: MapRegion,
}

impl<G: ContentGenerationPort> BackgroundSynthesisService<G> {
    pub fn new(generator: Arc<G>, region: MapRegion) -> Self {
        Self { generator, region }
    }

    /// Generate the background and return it as an embeddable data URL.
    ///
    /// Style constraints are requested in the prompt but not verified.
    pub async fn synthesize(&self, itinerary: &str) -> Result<String, GenerationError> {
        let request = ImageRequest::new(
            build_background_prompt(&self.region, itinerary),
            AspectRatio::Landscape,
        );

        let image = self
            .generator
            .generate_image(request)
            .await
            .map_err(|e| GenerationError::BackgroundSynthesisFailure(e.to_string()))?
            .ok_or_else(|| {
                GenerationError::BackgroundSynthesisFailure(
                    "Failed to generate map image".to_string(),
                )
            })?;

        tracing::debug!(mime_type = %image.mime_type, "Background image generated");
        Ok(image.to_data_url())
    }
}
