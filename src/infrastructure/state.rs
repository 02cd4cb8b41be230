//! Shared application state

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::application::services::{MapGenerationEvent, MapGenerationService};
use crate::domain::value_objects::{default_roster, MapRegion, RunId};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::gemini::GeminiClient;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub map_service: Arc<MapGenerationService<GeminiClient>>,
}

impl AppState {
    pub fn new(config: AppConfig, events: UnboundedSender<MapGenerationEvent>) -> Result<Self> {
        // Initialize Gemini client
        let generator = Arc::new(GeminiClient::from_config(&config)?);

        let region = MapRegion::default();
        let map_service = match config.decoration_seed {
            Some(seed) => MapGenerationService::with_seed(generator, region, default_roster(), seed),
            None => MapGenerationService::new(generator, region, default_roster()),
        }
        .with_event_sender(events);

        Ok(Self {
            config,
            map_service: Arc::new(map_service),
        })
    }

    /// Start a run in the background unless one is already in flight.
    ///
    /// A blank itinerary is replaced by the region's sample itinerary.
    pub async fn spawn_generation(&self, itinerary: &str) -> Option<RunId> {
        let run = self.map_service.try_begin().await?;
        let itinerary = self
            .map_service
            .region()
            .itinerary_or_sample(itinerary)
            .to_string();

        let service = self.map_service.clone();
        tokio::spawn(async move {
            match service.execute(run, &itinerary).await {
                Ok(report) => tracing::debug!(
                    %run,
                    locations = report.location_count,
                    decorations = report.decoration_count,
                    "Background run finished"
                ),
                Err(e) if e.is_superseded() => tracing::debug!(%run, "Background run superseded"),
                Err(e) => tracing::debug!(%run, error = %e, "Background run failed"),
            }
        });

        Some(run)
    }
}
