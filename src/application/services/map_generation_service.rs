//! Map Generation Service - Orchestrates a full generation run
//!
//! A run goes through two suspension points:
//!
//! 1. Location extraction. Nothing else is requested until it succeeds.
//! 2. The background and the character stickers, requested concurrently and
//!    awaited together.
//!
//! The background is mandatory, the stickers are not. All state lives in a
//! [`MapSession`] behind an async lock that is never held across a
//! generation call; every write is stamped with the run id so a superseded run
//! cannot clobber a newer one.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

use super::background_synthesis_service::BackgroundSynthesisService;
use super::decoration_service::DecorationService;
use super::generation_error::GenerationError;
use super::location_extraction_service::LocationExtractionService;
use crate::application::ports::outbound::ContentGenerationPort;
use crate::domain::aggregates::{AssetBundle, MapSession, MapSessionError};
use crate::domain::entities::{Location, MapState};
use crate::domain::value_objects::{CharacterDefinition, LocationId, MapRegion, RunId, RunStatus};

/// Message shown to the user when a run fails, whatever the cause
pub const RUN_FAILURE_MESSAGE: &str = "生成失敗，請稍後再試 (可能是 API 額度限制)";

/// Progress notifications published while runs execute
#[derive(Debug, Clone, PartialEq)]
pub enum MapGenerationEvent {
    RunStarted {
        run: RunId,
    },
    LocationsExtracted {
        run: RunId,
        location_count: usize,
    },
    AssetsReady {
        run: RunId,
        decoration_count: usize,
    },
    RunFailed {
        run: RunId,
        error: String,
    },
    StaleResultDiscarded {
        run: RunId,
        latest: RunId,
    },
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run: RunId,
    pub location_count: usize,
    pub decoration_count: usize,
    pub requested_decorations: usize,
}

/// Point-in-time copy of the session for readers
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub status: RunStatus,
    pub error: Option<String>,
    pub run: RunId,
    pub selected_location: Option<Location>,
    pub map: MapState,
}

pub struct MapGenerationService<G: ContentGenerationPort> {
    extractor: LocationExtractionService<G>,
    background: BackgroundSynthesisService<G>,
    decorations: DecorationService<G>,
    region: MapRegion,
    session: RwLock<MapSession>,
    events: Option<UnboundedSender<MapGenerationEvent>>,
}

impl<G: ContentGenerationPort> MapGenerationService<G> {
    /// Create a service with entropy-seeded decoration placement
    pub fn new(generator: Arc<G>, region: MapRegion, roster: Vec<CharacterDefinition>) -> Self {
        let decorations = DecorationService::new(generator.clone(), roster);
        Self::with_decorations(generator, region, decorations)
    }

    /// Create a service whose decoration jitter is reproducible
    pub fn with_seed(
        generator: Arc<G>,
        region: MapRegion,
        roster: Vec<CharacterDefinition>,
        seed: u64,
    ) -> Self {
        let decorations = DecorationService::with_seed(generator.clone(), roster, seed);
        Self::with_decorations(generator, region, decorations)
    }

    fn with_decorations(
        generator: Arc<G>,
        region: MapRegion,
        decorations: DecorationService<G>,
    ) -> Self {
        Self {
            extractor: LocationExtractionService::new(generator.clone(), region.clone()),
            background: BackgroundSynthesisService::new(generator, region.clone()),
            decorations,
            region,
            session: RwLock::new(MapSession::new()),
            events: None,
        }
    }

    /// Publish progress events on the given channel
    pub fn with_event_sender(mut self, events: UnboundedSender<MapGenerationEvent>) -> Self {
        self.events = Some(events);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn region(&self) -> &MapRegion {
        &self.region
    }

    pub async fn status(&self) -> RunStatus {
        self.session.read().await.status()
    }

    pub async fn snapshot(&self) -> MapSnapshot {
        let session = self.session.read().await;
        MapSnapshot {
            status: session.status(),
            error: session.error().map(str::to_string),
            run: session.latest_run(),
            selected_location: session.selected_location().cloned(),
            map: session.map().clone(),
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub async fn select_location(&self, id: LocationId) -> Result<Location, MapSessionError> {
        let mut session = self.session.write().await;
        session.select_location(id).cloned()
    }

    pub async fn clear_selection(&self) {
        self.session.write().await.clear_selection();
    }

    // ========================================================================
    // Runs
    // ========================================================================

    /// Start a run only if no run is in flight. Returns `None` when busy.
    ///
    /// Callers that accept user triggers use this to gate re-entry; the check
    /// and the transition happen under one lock.
    pub async fn try_begin(&self) -> Option<RunId> {
        let mut session = self.session.write().await;
        if session.status().is_generating() {
            return None;
        }
        let run = session.begin_run();
        drop(session);
        self.on_run_started(run);
        Some(run)
    }

    /// Start a run unconditionally and drive it to completion.
    ///
    /// Production callers go through [`Self::try_begin`]; this entry point
    /// exists to stage overlapping runs.
    ///
    /// A run already in flight is superseded: its results will be discarded.
    #[cfg(test)]
    pub async fn generate(&self, itinerary: &str) -> Result<RunReport, GenerationError> {
        let run = self.session.write().await.begin_run();
        self.on_run_started(run);
        self.execute(run, itinerary).await
    }

    /// Drive a run that was started with [`Self::try_begin`]
    pub async fn execute(&self, run: RunId, itinerary: &str) -> Result<RunReport, GenerationError> {
        let locations = match self.extractor.extract(itinerary).await {
            Ok(locations) => locations,
            Err(e) => return self.fail(run, e).await,
        };
        let location_count = locations.len();

        if let Err(e) = self.session.write().await.record_locations(run, locations) {
            return Err(self.discard(run, e));
        }
        tracing::info!(%run, location_count, "Locations extracted, generating assets");
        self.publish(MapGenerationEvent::LocationsExtracted {
            run,
            location_count,
        });

        let (background, decorations) = tokio::join!(
            self.background.synthesize(itinerary),
            self.decorations.decorate()
        );

        let background_url = match background {
            Ok(url) => url,
            Err(e) => return self.fail(run, e).await,
        };
        let decoration_count = decorations.len();

        let assets = AssetBundle {
            background_url,
            decorations,
            region_name: Some(self.region.name.clone()),
            generated_at: Utc::now(),
        };
        if let Err(e) = self.session.write().await.record_assets(run, assets) {
            return Err(self.discard(run, e));
        }

        tracing::info!(%run, location_count, decoration_count, "Map ready");
        self.publish(MapGenerationEvent::AssetsReady {
            run,
            decoration_count,
        });

        Ok(RunReport {
            run,
            location_count,
            decoration_count,
            requested_decorations: self.decorations.roster_size(),
        })
    }

    fn on_run_started(&self, run: RunId) {
        tracing::info!(%run, "Map generation started");
        self.publish(MapGenerationEvent::RunStarted { run });
    }

    async fn fail(&self, run: RunId, error: GenerationError) -> Result<RunReport, GenerationError> {
        let recorded = self
            .session
            .write()
            .await
            .record_failure(run, RUN_FAILURE_MESSAGE);

        if let Err(e) = recorded {
            tracing::debug!(%run, cause = %error, "Failure of superseded run ignored");
            return Err(self.discard(run, e));
        }

        tracing::error!(%run, cause = %error, "Map generation failed");
        self.publish(MapGenerationEvent::RunFailed {
            run,
            error: error.to_string(),
        });
        Err(error)
    }

    fn discard(&self, run: RunId, reason: MapSessionError) -> GenerationError {
        match reason {
            MapSessionError::StaleRun { latest, .. } => {
                tracing::warn!(%run, %latest, "Discarding results of superseded run");
                self.publish(MapGenerationEvent::StaleResultDiscarded { run, latest });
            }
            other => {
                tracing::error!(%run, error = %other, "Run results rejected by session");
            }
        }
        GenerationError::Superseded(run)
    }

    fn publish(&self, event: MapGenerationEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                tracing::debug!("Generation event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::InlineImage;
    use crate::application::services::test_support::{locations_json, Scripted, ScriptedGenerator};
    use crate::domain::value_objects::{all_separated, default_roster};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::sync::Notify;

    const ITINERARY: &str = "7/15 法蘭克福 -> 科爾馬\n7/16 上國王堡 -> 猴子山";

    fn service(generator: Arc<ScriptedGenerator>) -> MapGenerationService<ScriptedGenerator> {
        MapGenerationService::with_seed(
            generator,
            MapRegion::black_forest_alsace(),
            default_roster(),
            7,
        )
    }

    fn drain(rx: &mut UnboundedReceiver<MapGenerationEvent>) -> Vec<MapGenerationEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    async fn wait_for_extraction(generator: &ScriptedGenerator, calls: usize) {
        while generator.structured_calls() < calls {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_successful_run_reaches_ready() {
        let generator = Arc::new(ScriptedGenerator::new(locations_json(13)));
        let (tx, mut rx) = unbounded_channel();
        let svc = service(generator.clone()).with_event_sender(tx);

        let report = svc.generate(ITINERARY).await.unwrap();

        assert_eq!(report.location_count, 13);
        assert_eq!(report.decoration_count, 4);
        assert_eq!(report.requested_decorations, 4);

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Ready);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.run, report.run);
        assert_eq!(snapshot.map.region_name.as_deref(), Some("Black Forest & Alsace"));
        assert!(snapshot.map.generated_at.is_some());
        assert_eq!(
            snapshot.map.background_url.as_deref(),
            Some("data:image/png;base64,YmFja2dyb3VuZA==")
        );

        let positions: Vec<_> = snapshot.map.locations.iter().map(|l| l.position()).collect();
        assert!(all_separated(&positions));

        assert_eq!(generator.structured_calls(), 1);
        assert_eq!(generator.background_calls(), 1);
        assert_eq!(generator.character_calls(), 4);

        assert_eq!(
            drain(&mut rx),
            vec![
                MapGenerationEvent::RunStarted { run: report.run },
                MapGenerationEvent::LocationsExtracted {
                    run: report.run,
                    location_count: 13
                },
                MapGenerationEvent::AssetsReady {
                    run: report.run,
                    decoration_count: 4
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_character_failure_still_ready() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(4))
                .failing_character("Hachiware")
                .failing_character("Kurimanju"),
        );
        let svc = service(generator);

        let report = svc.generate(ITINERARY).await.unwrap();

        assert_eq!(report.decoration_count, 2);
        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Ready);
        assert!(snapshot.map.background_url.is_some());
        let ids: Vec<&str> = snapshot.map.decorations.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["char-0", "char-2"]);
    }

    #[tokio::test]
    async fn test_all_characters_failing_still_ready() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(4))
                .failing_character("Chiikawa")
                .failing_character("Hachiware")
                .failing_character("Usagi")
                .failing_character("Kurimanju"),
        );
        let svc = service(generator);

        let report = svc.generate(ITINERARY).await.unwrap();

        assert_eq!(report.decoration_count, 0);
        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Ready);
        assert!(snapshot.map.decorations.is_empty());
        assert!(snapshot.map.background_url.is_some());
    }

    #[tokio::test]
    async fn test_background_failure_keeps_previous_map() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(3))
                .with_structured(vec![
                    Scripted::Reply(locations_json(3)),
                    Scripted::Reply(locations_json(6)),
                ])
                .with_backgrounds(vec![
                    Scripted::Reply(InlineImage::png("Zmlyc3Q=")),
                    Scripted::Fail,
                ]),
        );
        let (tx, mut rx) = unbounded_channel();
        let svc = service(generator).with_event_sender(tx);

        svc.generate(ITINERARY).await.unwrap();
        let before = svc.snapshot().await.map;

        let err = svc.generate(ITINERARY).await.unwrap_err();
        assert!(matches!(err, GenerationError::BackgroundSynthesisFailure(_)));

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some(RUN_FAILURE_MESSAGE));
        assert_eq!(snapshot.map, before);
        assert_eq!(snapshot.map.locations.len(), 3);

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(MapGenerationEvent::RunFailed { run, .. }) if *run == snapshot.run
        ));
    }

    #[tokio::test]
    async fn test_background_failure_wins_over_partial_stickers() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(3))
                .with_structured(vec![
                    Scripted::Reply(locations_json(3)),
                    Scripted::Reply(locations_json(7)),
                ])
                .with_backgrounds(vec![
                    Scripted::Reply(InlineImage::png("Zmlyc3Q=")),
                    Scripted::Fail,
                ])
                .failing_character("Usagi")
                .empty_character("Kurimanju"),
        );
        let svc = service(generator.clone());

        svc.generate(ITINERARY).await.unwrap();
        let before = svc.snapshot().await.map;
        assert_eq!(before.decorations.len(), 2);

        let err = svc.generate(ITINERARY).await.unwrap_err();
        assert!(matches!(err, GenerationError::BackgroundSynthesisFailure(_)));
        assert_eq!(generator.character_calls(), 8);

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some(RUN_FAILURE_MESSAGE));
        assert_eq!(snapshot.map, before);
    }

    #[tokio::test]
    async fn test_background_failure_with_every_sticker_failing() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(4))
                .with_background(Scripted::Fail)
                .failing_character("Chiikawa")
                .failing_character("Hachiware")
                .failing_character("Usagi")
                .failing_character("Kurimanju"),
        );
        let svc = service(generator);

        let err = svc.generate(ITINERARY).await.unwrap_err();
        assert!(matches!(err, GenerationError::BackgroundSynthesisFailure(_)));

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some(RUN_FAILURE_MESSAGE));
        assert!(snapshot.map.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_asset_requests() {
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(2))
                .with_structured(vec![Scripted::Reply(locations_json(2)), Scripted::Fail]),
        );
        let svc = service(generator.clone());

        svc.generate(ITINERARY).await.unwrap();
        let before = svc.snapshot().await.map;

        let err = svc.generate(ITINERARY).await.unwrap_err();
        assert!(matches!(err, GenerationError::ExtractionFailure(_)));

        assert_eq!(generator.structured_calls(), 2);
        assert_eq!(generator.background_calls(), 1);
        assert_eq!(generator.character_calls(), 4);

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Error);
        assert_eq!(snapshot.map, before);
    }

    #[tokio::test]
    async fn test_failed_first_run_leaves_empty_map() {
        let generator = Arc::new(ScriptedGenerator::new("not json"));
        let svc = service(generator.clone());

        assert!(svc.generate(ITINERARY).await.is_err());

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.status, RunStatus::Error);
        assert!(snapshot.map.is_empty());
        assert_eq!(generator.background_calls(), 0);
        assert_eq!(generator.character_calls(), 0);
    }

    #[tokio::test]
    async fn test_try_begin_rejects_while_generating() {
        let gate = Arc::new(Notify::new());
        let generator =
            Arc::new(ScriptedGenerator::new(locations_json(3)).with_extraction_gate(gate.clone()));
        let svc = Arc::new(service(generator.clone()));

        let run = svc.try_begin().await.unwrap();
        let handle = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.execute(run, ITINERARY).await })
        };
        wait_for_extraction(&generator, 1).await;

        assert!(svc.try_begin().await.is_none());
        assert_eq!(svc.status().await, RunStatus::ExtractingLocations);

        gate.notify_one();
        handle.await.unwrap().unwrap();

        assert_eq!(svc.status().await, RunStatus::Ready);
        assert!(svc.try_begin().await.is_some());
    }

    #[tokio::test]
    async fn test_superseded_run_cannot_overwrite_newer_run() {
        let gate = Arc::new(Notify::new());
        let generator = Arc::new(
            ScriptedGenerator::new(locations_json(3))
                .with_structured(vec![
                    Scripted::Reply(locations_json(3)),
                    Scripted::Reply(locations_json(5)),
                ])
                .with_extraction_gate(gate.clone()),
        );
        let (tx, mut rx) = unbounded_channel();
        let svc = Arc::new(service(generator.clone()).with_event_sender(tx));

        let first = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.generate(ITINERARY).await })
        };
        wait_for_extraction(&generator, 1).await;

        let second = svc.generate(ITINERARY).await.unwrap();
        let settled = svc.snapshot().await;
        assert_eq!(settled.status, RunStatus::Ready);
        assert_eq!(settled.map.locations.len(), 5);

        gate.notify_one();
        let err = first.await.unwrap().unwrap_err();
        assert!(err.is_superseded());

        let snapshot = svc.snapshot().await;
        assert_eq!(snapshot.run, second.run);
        assert_eq!(snapshot.status, RunStatus::Ready);
        assert_eq!(snapshot.map, settled.map);

        let events = drain(&mut rx);
        assert!(events.contains(&MapGenerationEvent::StaleResultDiscarded {
            run: RunId::default().next(),
            latest: second.run,
        }));
    }

    #[tokio::test]
    async fn test_new_run_clears_selection() {
        let generator = Arc::new(ScriptedGenerator::new(locations_json(3)));
        let svc = service(generator);

        svc.generate(ITINERARY).await.unwrap();
        let target = svc.snapshot().await.map.locations[1].clone();

        let selected = svc.select_location(target.id.clone()).await.unwrap();
        assert_eq!(selected, target);
        assert_eq!(svc.snapshot().await.selected_location, Some(target));

        svc.generate(ITINERARY).await.unwrap();
        assert!(svc.snapshot().await.selected_location.is_none());
    }

    #[tokio::test]
    async fn test_select_unknown_location() {
        let svc = service(Arc::new(ScriptedGenerator::new(locations_json(1))));
        svc.generate(ITINERARY).await.unwrap();

        let err = svc
            .select_location(LocationId::new("loc-missing"))
            .await
            .unwrap_err();
        assert_eq!(err, MapSessionError::UnknownLocation(LocationId::new("loc-missing")));
    }
}
