use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use pii_engine::traits::Detector;
use pii_engine::{EngineError, StateError};

use crate::app::AppState;

#[derive(Serialize)]
pub struct ImportResponse {
    pub restored: usize,
}

#[derive(Serialize)]
pub struct StateErrorResponse {
    pub error: String,
}

/// Export the engine's recoverable state as an opaque versioned blob.
///
/// The blob never contains key material. It does carry mapping entries
/// with the original entity text, so it is as confidential as the
/// PII itself and must be stored accordingly.
pub async fn export_state_handler<D: Detector>(
    Extension(state): Extension<AppState<D>>,
) -> Response {
    match state.engine.export_state() {
        Ok(blob) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            blob,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StateErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Import a previously exported blob. The body is the blob itself.
pub async fn import_state_handler<D: Detector>(
    Extension(state): Extension<AppState<D>>,
    body: String,
) -> Response {
    match state.engine.import_state(&body) {
        Ok(restored) => (StatusCode::OK, Json(ImportResponse { restored })).into_response(),
        Err(e) => {
            warn!(error = %e, "state import rejected");
            let status = match &e {
                EngineError::State(StateError::ContextMismatch { .. }) => StatusCode::CONFLICT,
                EngineError::State(StateError::UnsupportedVersion { .. }) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            };
            (
                status,
                Json(StateErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
