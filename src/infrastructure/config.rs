//! Application configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API key
    pub gemini_api_key: String,
    /// Gemini REST base URL, without a trailing slash
    pub gemini_base_url: String,
    /// Model used for location extraction
    pub gemini_text_model: String,
    /// Model used for the background and the stickers
    pub gemini_image_model: String,
    /// Per-request timeout for generation calls
    pub gemini_timeout: Duration,

    /// HTTP server port
    pub server_port: u16,
    /// Kick off a run with the sample itinerary when the server starts
    pub generate_on_startup: bool,
    /// Fixed seed for decoration jitter, entropy when unset
    pub decoration_seed: Option<u64>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs: u64 = var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|| "120".to_string())
            .parse()
            .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            gemini_api_key: var("GEMINI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .context("GEMINI_API_KEY environment variable is required")?,
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string())
                .trim_end_matches('/')
                .to_string(),
            gemini_text_model: var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            gemini_image_model: var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash-image".to_string()),
            gemini_timeout: Duration::from_secs(timeout_secs),

            server_port: var("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            generate_on_startup: env_or(&var, "GENERATE_ON_STARTUP", true),
            decoration_seed: var("DECORATION_SEED")
                .map(|seed| seed.parse::<u64>())
                .transpose()
                .context("DECORATION_SEED must be an unsigned integer")?,
        })
    }
}

fn env_or<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
