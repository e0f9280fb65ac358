// Main entry point for the redaction API server

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pii_engine::detectors::LlmDetector;
use pii_engine::{RedactionEngine, SealParams, SealedBackend, SealedContext};
use pii_server::{build_app, AppState, Config};

const DEFAULT_DETECTOR_MODEL: &str = "gpt-4o-mini";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pii_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting redaction API server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Build the detector and engine
    let model = config
        .detector_model
        .clone()
        .unwrap_or_else(|| DEFAULT_DETECTOR_MODEL.to_string());
    let mut detector = LlmDetector::new(config.openai_api_key.clone(), model);
    if let Some(base_url) = &config.detector_base_url {
        detector = detector.with_base_url(base_url.clone());
    }

    // A fresh context per process: ciphertexts are only recoverable
    // within this process unless state is exported and the key managed
    // out of band.
    let context = SealedContext::generate(SealParams::default());
    let engine = RedactionEngine::new(detector, SealedBackend::new(), context);

    let app = build_app(AppState {
        engine: Arc::new(engine),
        default_min_tier: config.default_min_tier,
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
