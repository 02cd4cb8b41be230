//! Port for the upstream generative content service

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A text generation request whose answer must follow a JSON schema
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub response_schema: serde_json::Value,
}

impl StructuredRequest {
    pub fn new(prompt: impl Into<String>, response_schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "4:3",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio,
        }
    }
}

/// Image bytes returned inline by the generator, base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    #[cfg(test)]
    pub fn png(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data: data.into(),
        }
    }

    /// Embeddable `data:` URL for the renderer
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The generative service behind every asset on the map.
///
/// `Ok(None)` means the service answered but produced no usable payload;
/// callers decide whether that is fatal.
#[async_trait]
pub trait ContentGenerationPort: Send + Sync {
    /// Returns the raw JSON text of the structured answer
    async fn generate_structured(&self, request: StructuredRequest) -> Result<Option<String>>;

    /// Returns the first inline image of the answer
    async fn generate_image(&self, request: ImageRequest) -> Result<Option<InlineImage>>;
}
