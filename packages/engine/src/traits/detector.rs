//! Detector trait for external entity detection services.

use async_trait::async_trait;

use crate::error::DetectResult;
use crate::types::CandidateEntity;

/// An external PII detector.
///
/// Implementations wrap a specific NER service (an LLM endpoint, a
/// model server) and handle prompting and response parsing. The engine
/// consumes only the output contract: a sequence of candidates with
/// possibly incorrect offsets.
///
/// Detection is best-effort from the engine's point of view: errors
/// are retried a bounded number of times and then degrade to an empty
/// entity list, never failing the redaction call.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Detect PII candidates in `text`.
    ///
    /// Per-record tolerance is the implementation's job: a malformed
    /// record in the service response is skipped, not an error.
    async fn detect(&self, text: &str) -> DetectResult<Vec<CandidateEntity>>;
}
