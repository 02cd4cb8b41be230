//! Scripted generator shared by the service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::application::ports::outbound::{
    AspectRatio, ContentGenerationPort, ImageRequest, InlineImage, StructuredRequest,
};

/// What a scripted call answers with
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Reply(T),
    Empty,
    Fail,
}

/// Generator double: canned answers plus per-kind call counters.
///
/// Landscape image requests are treated as backgrounds, square ones as
/// character stickers.
pub struct ScriptedGenerator {
    /// One answer per structured call; the last entry repeats
    structured: Vec<Scripted<String>>,
    /// One answer per background call; the last entry repeats
    backgrounds: Vec<Scripted<InlineImage>>,
    /// Character prompts containing any of these fail
    failing_characters: Vec<String>,
    /// Character prompts containing any of these come back without an image
    empty_characters: Vec<String>,
    /// Held by the first structured call until notified
    extraction_gate: Mutex<Option<Arc<Notify>>>,
    pub structured_calls: AtomicUsize,
    pub background_calls: AtomicUsize,
    pub character_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(locations_json: impl Into<String>) -> Self {
        Self {
            structured: vec![Scripted::Reply(locations_json.into())],
            backgrounds: vec![Scripted::Reply(InlineImage::png("YmFja2dyb3VuZA=="))],
            failing_characters: Vec::new(),
            empty_characters: Vec::new(),
            extraction_gate: Mutex::new(None),
            structured_calls: AtomicUsize::new(0),
            background_calls: AtomicUsize::new(0),
            character_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_structured(mut self, answers: Vec<Scripted<String>>) -> Self {
        self.structured = answers;
        self
    }

    pub fn with_background(self, background: Scripted<InlineImage>) -> Self {
        self.with_backgrounds(vec![background])
    }

    pub fn with_backgrounds(mut self, backgrounds: Vec<Scripted<InlineImage>>) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    pub fn failing_character(mut self, prompt_fragment: &str) -> Self {
        self.failing_characters.push(prompt_fragment.to_string());
        self
    }

    pub fn empty_character(mut self, prompt_fragment: &str) -> Self {
        self.empty_characters.push(prompt_fragment.to_string());
        self
    }

    pub fn with_extraction_gate(self, gate: Arc<Notify>) -> Self {
        *self.extraction_gate.lock().unwrap() = Some(gate);
        self
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn background_calls(&self) -> usize {
        self.background_calls.load(Ordering::SeqCst)
    }

    pub fn character_calls(&self) -> usize {
        self.character_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerationPort for ScriptedGenerator {
    async fn generate_structured(&self, _request: StructuredRequest) -> anyhow::Result<Option<String>> {
        let call = self.structured_calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .structured
            .get(call)
            .or_else(|| self.structured.last())
            .cloned()
            .unwrap_or(Scripted::Empty);

        let gate = self.extraction_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match answer {
            Scripted::Reply(json) => Ok(Some(json)),
            Scripted::Empty => Ok(None),
            Scripted::Fail => Err(anyhow!("quota exceeded")),
        }
    }

    async fn generate_image(&self, request: ImageRequest) -> anyhow::Result<Option<InlineImage>> {
        match request.aspect_ratio {
            AspectRatio::Landscape => {
                let call = self.background_calls.fetch_add(1, Ordering::SeqCst);
                let answer = self
                    .backgrounds
                    .get(call)
                    .or_else(|| self.backgrounds.last())
                    .cloned()
                    .unwrap_or(Scripted::Empty);
                match answer {
                    Scripted::Reply(image) => Ok(Some(image)),
                    Scripted::Empty => Ok(None),
                    Scripted::Fail => Err(anyhow!("image model unavailable")),
                }
            }
            AspectRatio::Square => {
                self.character_calls.fetch_add(1, Ordering::SeqCst);
                if self
                    .failing_characters
                    .iter()
                    .any(|f| request.prompt.contains(f.as_str()))
                {
                    return Err(anyhow!("sticker generation failed"));
                }
                if self
                    .empty_characters
                    .iter()
                    .any(|f| request.prompt.contains(f.as_str()))
                {
                    return Ok(None);
                }
                Ok(Some(InlineImage::png("c3RpY2tlcg==")))
            }
        }
    }
}

/// JSON for `count` well-separated locations without ids
pub fn locations_json(count: usize) -> String {
    let items: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "name": format!("Stop {}", i),
                "description": "好期待！",
                "emoji": "📍",
                "x": 10.0 + (i % 5) as f64 * 20.0,
                "y": 10.0 + (i / 5) as f64 * 20.0,
                "tags": ["tag-a", "tag-b"]
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
