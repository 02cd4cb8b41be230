//! Gemini client for location extraction and image generation

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::outbound::{
    AspectRatio, ContentGenerationPort, ImageRequest, InlineImage, StructuredRequest,
};
use crate::infrastructure::config::AppConfig;

/// Client for the Gemini `generateContent` API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        text_model: &str,
        image_model: &str,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GeminiError> {
        Self::new(
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.gemini_text_model,
            &config.gemini_image_model,
            config.gemini_timeout,
        )
    }

    /// Send one `generateContent` call and return the decoded answer
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(GeminiError::ApiError(format!("Status {}: {}", status, error_text)));
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(body)
    }

    /// Ask the text model for JSON matching `schema`
    pub async fn generate_json(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<Option<String>, GeminiError> {
        let request = GenerateContentRequest::text(prompt).with_config(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        });

        let response = self.generate_content(&self.text_model, &request).await?;
        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()));
        }
        Ok(response.text())
    }

    /// Ask the image model for a single picture
    pub async fn generate_picture(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Option<InlineImage>, GeminiError> {
        let request = GenerateContentRequest::text(prompt).with_config(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: aspect_ratio.as_str().to_string(),
            }),
            ..Default::default()
        });

        let response = self.generate_content(&self.image_model, &request).await?;
        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()));
        }
        response.first_image()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Prompt blocked: {0}")]
    Blocked(String),
    #[error("Inline image is not valid base64: {0}")]
    InvalidImageData(String),
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn text(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    /// Concatenated text of the first candidate, `None` when there is none
    pub fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First inline image of the first candidate. Later image parts are
    /// ignored; the image models answer with a single picture.
    pub fn first_image(&self) -> Result<Option<InlineImage>, GeminiError> {
        let Some(inline) = self.parts().find_map(|p| p.inline_data.as_ref()) else {
            return Ok(None);
        };

        base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| GeminiError::InvalidImageData(e.to_string()))?;

        Ok(Some(InlineImage {
            mime_type: inline.mime_type.clone(),
            data: inline.data.clone(),
        }))
    }
}

// =============================================================================
// ContentGenerationPort Implementation
// =============================================================================

#[async_trait]
impl ContentGenerationPort for GeminiClient {
    async fn generate_structured(&self, request: StructuredRequest) -> Result<Option<String>> {
        let text = self
            .generate_json(&request.prompt, request.response_schema)
            .await?;
        Ok(text)
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<Option<InlineImage>> {
        let image = self
            .generate_picture(&request.prompt, request.aspect_ratio)
            .await?;
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_structured_request_body() {
        let request = GenerateContentRequest::text("list stops").with_config(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(serde_json::json!({ "type": "ARRAY" })),
            ..Default::default()
        });

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "list stops");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(body["generationConfig"].get("imageConfig").is_none());
        assert!(body["contents"][0]["parts"][0].get("inlineData").is_none());
    }

    #[test]
    fn test_image_request_body() {
        let request = GenerateContentRequest::text("a map").with_config(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: AspectRatio::Landscape.as_str().to_string(),
            }),
            ..Default::default()
        });

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "4:3");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let response = parse(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[{\"name\":" }, { "text": "\"Roth\"}]" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));

        assert_eq!(response.text().as_deref(), Some("[{\"name\":\"Roth\"}]"));
    }

    #[test]
    fn test_text_missing() {
        assert_eq!(parse(serde_json::json!({})).text(), None);
        let no_content = parse(serde_json::json!({ "candidates": [{}] }));
        assert_eq!(no_content.text(), None);
    }

    #[test]
    fn test_first_image_skips_text_parts() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your map" },
                { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
            ] } }]
        }));

        let image = response.first_image().unwrap().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_first_image_wins_over_later_parts() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } },
                { "inlineData": { "mimeType": "image/jpeg", "data": "c2Vjb25k" } }
            ] } }]
        }));

        let image = response.first_image().unwrap().unwrap();
        assert_eq!(image.data, "Zmlyc3Q=");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_first_image_absent() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "no image today" }] } }]
        }));

        assert!(response.first_image().unwrap().is_none());
    }

    #[test]
    fn test_first_image_rejects_invalid_base64() {
        let response = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "not base64!" } }
            ] } }]
        }));

        assert!(matches!(
            response.first_image(),
            Err(GeminiError::InvalidImageData(_))
        ));
    }

    #[test]
    fn test_block_reason() {
        let response = parse(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));

        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
