//! Decoration Service - Character stickers scattered over the map
//!
//! Every roster entry is generated as an independent request and all of them
//! are awaited together. A failed entry is logged and left out; the batch
//! itself never fails, it just comes back shorter.

use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::ports::outbound::{
    AspectRatio, ContentGenerationPort, ImageRequest, InlineImage,
};
use crate::domain::entities::Decoration;
use crate::domain::value_objects::{
    decoration_anchor, CharacterDefinition, DecorationId, DECORATION_JITTER,
};

/// Maximum sticker tilt in degrees, either direction
const MAX_ROTATION_DEGREES: f64 = 10.0;
const DECORATION_SCALE: f64 = 0.9;

pub struct DecorationService<G: ContentGenerationPort> {
    generator: Arc<G>,
    roster: Vec<CharacterDefinition>,
    rng: Mutex<StdRng>,
}

impl<G: ContentGenerationPort> DecorationService<G> {
    pub fn new(generator: Arc<G>, roster: Vec<CharacterDefinition>) -> Self {
        Self::with_rng(generator, roster, StdRng::from_entropy())
    }

    /// Use a fixed seed for jitter and tilt
    pub fn with_seed(generator: Arc<G>, roster: Vec<CharacterDefinition>, seed: u64) -> Self {
        Self::with_rng(generator, roster, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: Arc<G>, roster: Vec<CharacterDefinition>, rng: StdRng) -> Self {
        Self {
            generator,
            roster,
            rng: Mutex::new(rng),
        }
    }

    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    /// Generate one decoration per roster entry that succeeds, in roster order
    pub async fn decorate(&self) -> Vec<Decoration> {
        let requests = self
            .roster
            .iter()
            .enumerate()
            .map(|(slot, character)| self.generate_sticker(slot, character));

        let settled: Vec<Option<(usize, InlineImage)>> = join_all(requests).await;

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let decorations: Vec<Decoration> = settled
            .into_iter()
            .flatten()
            .map(|(slot, image)| place_decoration(slot, &self.roster[slot], &image, &mut *rng))
            .collect();

        tracing::info!(
            generated = decorations.len(),
            requested = self.roster.len(),
            "Decoration batch settled"
        );
        decorations
    }

    async fn generate_sticker(
        &self,
        slot: usize,
        character: &CharacterDefinition,
    ) -> Option<(usize, InlineImage)> {
        let request = ImageRequest::new(character.prompt.clone(), AspectRatio::Square);
        let zone = decoration_anchor(slot).label;
        match self.generator.generate_image(request).await {
            Ok(Some(image)) => Some((slot, image)),
            Ok(None) => {
                tracing::warn!(character = %character.name, zone, "No sticker image returned");
                None
            }
            Err(e) => {
                tracing::warn!(character = %character.name, zone, error = %e, "Failed to generate sticker");
                None
            }
        }
    }
}

fn place_decoration<R: Rng>(
    slot: usize,
    character: &CharacterDefinition,
    image: &InlineImage,
    rng: &mut R,
) -> Decoration {
    let position = decoration_anchor(slot)
        .point
        .jittered(rng, DECORATION_JITTER);

    Decoration {
        id: DecorationId::new(format!("char-{}", slot)),
        name: character.name.clone(),
        image_url: image.to_data_url(),
        x: position.x,
        y: position.y,
        rotation: rng.gen_range(-MAX_ROTATION_DEGREES..=MAX_ROTATION_DEGREES),
        scale: DECORATION_SCALE,
        message: character.default_message.clone(),
    }
}
