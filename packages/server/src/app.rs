//! Application setup and router construction.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Extension;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use pii_engine::backend::SealedBackend;
use pii_engine::traits::Detector;
use pii_engine::RedactionEngine;

use crate::routes::{
    decrypt_handler, export_state_handler, health_handler, import_state_handler, redact_handler,
};

/// Shared application state
pub struct AppState<D> {
    pub engine: Arc<RedactionEngine<D, SealedBackend>>,
    pub default_min_tier: u8,
}

// Manual impl: `#[derive(Clone)]` would require `D: Clone`, but the
// engine is only ever shared through the Arc.
impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            default_min_tier: self.default_min_tier,
        }
    }
}

/// Build the Axum application router
pub fn build_app<D>(state: AppState<D>) -> Router
where
    D: Detector + 'static,
{
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/redact", post(redact_handler::<D>))
        .route("/decrypt", post(decrypt_handler::<D>))
        .route("/state/export", get(export_state_handler::<D>))
        .route("/state/import", post(import_state_handler::<D>))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(cors)
}
