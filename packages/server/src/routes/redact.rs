use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use pii_engine::traits::Detector;
use pii_engine::types::RedactedEntity;

use crate::app::AppState;

#[derive(Deserialize)]
pub struct RedactRequest {
    pub text: String,
    /// Minimum sensitivity tier to redact; server default when omitted.
    pub min_tier: Option<u8>,
}

#[derive(Serialize)]
pub struct RedactResponse {
    pub processed_text: String,
    pub redacted_entities: Vec<RedactedEntity>,
    pub total_entities: usize,
    pub encrypted_count: usize,
}

/// Redact PII in the submitted text and return the processed text
/// plus the identifiers needed to recover each redacted span.
///
/// The original text is deliberately absent from the response: the
/// caller already has it, and echoing it back would put the sensitive
/// content on the wire a second time.
pub async fn redact_handler<D: Detector>(
    Extension(state): Extension<AppState<D>>,
    Json(request): Json<RedactRequest>,
) -> (StatusCode, Json<RedactResponse>) {
    let min_tier = request.min_tier.unwrap_or(state.default_min_tier);
    let result = state.engine.redact(&request.text, min_tier).await;

    (
        StatusCode::OK,
        Json(RedactResponse {
            processed_text: result.processed_text,
            redacted_entities: result.redacted_entities,
            total_entities: result.total_entities,
            encrypted_count: result.encrypted_count,
        }),
    )
}
