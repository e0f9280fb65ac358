use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use pii_engine::engine::decryption_sentinel;
use pii_engine::traits::Detector;
use pii_engine::EngineError;

use crate::app::AppState;

#[derive(Deserialize)]
pub struct DecryptRequest {
    pub identifier: String,
}

#[derive(Serialize)]
pub struct DecryptResponse {
    pub identifier: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct DecryptErrorResponse {
    pub identifier: String,
    pub error: String,
    /// Display token for UIs that substitute the failed span inline.
    pub rendered: String,
}

/// Recover the original text for a redaction identifier.
///
/// Failures carry a rendered sentinel instead of any plausible wrong
/// text.
pub async fn decrypt_handler<D: Detector>(
    Extension(state): Extension<AppState<D>>,
    Json(request): Json<DecryptRequest>,
) -> Response {
    match state.engine.decrypt(&request.identifier) {
        Ok(text) => (
            StatusCode::OK,
            Json(DecryptResponse {
                identifier: request.identifier,
                text,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(identifier = %request.identifier, error = %e, "decrypt failed");
            let status = match e {
                EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
                EngineError::NotEncrypted { .. } => StatusCode::CONFLICT,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            (
                status,
                Json(DecryptErrorResponse {
                    rendered: decryption_sentinel(&request.identifier),
                    identifier: request.identifier,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
