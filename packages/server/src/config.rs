use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub detector_model: Option<String>,
    pub detector_base_url: Option<String>,
    /// Minimum sensitivity tier redacted when a request does not
    /// specify one.
    pub default_min_tier: u8,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            detector_model: env::var("DETECTOR_MODEL").ok(),
            detector_base_url: env::var("DETECTOR_BASE_URL").ok(),
            default_min_tier: env::var("DEFAULT_MIN_TIER")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("DEFAULT_MIN_TIER must be 1, 2, or 3")?,
        })
    }
}
