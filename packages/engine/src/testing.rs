//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the engine
//! without making real detector or backend calls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::backend::SealedContext;
use crate::error::{CryptoError, CryptoResult, DetectError, DetectResult};
use crate::traits::{Detector, EncryptionBackend};
use crate::types::CandidateEntity;

/// A mock detector returning a configured candidate list.
///
/// Supports injected failures for exercising the engine's retry and
/// degradation paths, and tracks call counts for assertions.
#[derive(Default)]
pub struct MockDetector {
    response: Arc<RwLock<Vec<CandidateEntity>>>,
    /// Fail this many calls before succeeding. `u32::MAX` fails forever.
    remaining_failures: Arc<AtomicU32>,
    calls: Arc<AtomicU32>,
}

impl MockDetector {
    /// Create a mock that returns no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate list returned on success.
    pub fn with_response(self, candidates: Vec<CandidateEntity>) -> Self {
        *self.response.write().unwrap() = candidates;
        self
    }

    /// Fail the first `n` calls, then succeed.
    pub fn fail_times(self, n: u32) -> Self {
        self.remaining_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every call.
    pub fn failing(self) -> Self {
        self.fail_times(u32::MAX)
    }

    /// Number of `detect` calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Detector for MockDetector {
    async fn detect(&self, _text: &str) -> DetectResult<Vec<CandidateEntity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(DetectError::MalformedResponse(
                "injected mock failure".to_string(),
            ));
        }

        Ok(self.response.read().unwrap().clone())
    }
}

/// A backend whose `encrypt` always fails, for exercising the
/// unencrypted-entity reporting path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingBackend;

impl FailingBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EncryptionBackend for FailingBackend {
    type Context = SealedContext;

    fn encrypt(&self, _context: &SealedContext, _vector: &[f64]) -> CryptoResult<Vec<u8>> {
        Err(CryptoError::AuthenticationFailed)
    }

    fn decrypt(&self, _context: &SealedContext, _ciphertext: &[u8]) -> CryptoResult<Vec<f64>> {
        Err(CryptoError::AuthenticationFailed)
    }

    fn serialize_context(&self, context: &SealedContext) -> Vec<u8> {
        crate::backend::SealedBackend::new().serialize_context(context)
    }

    fn deserialize_context(&self, bytes: &[u8]) -> CryptoResult<SealedContext> {
        crate::backend::SealedBackend::new().deserialize_context(bytes)
    }

    fn fingerprint(&self, context: &SealedContext) -> String {
        context.fingerprint_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_detector_fail_then_succeed() {
        let detector = MockDetector::new()
            .with_response(vec![CandidateEntity {
                text: "a".to_string(),
                label: "MISC".to_string(),
                start: 0,
                end: 1,
                confidence: 1.0,
            }])
            .fail_times(1);

        assert!(detector.detect("x").await.is_err());
        assert_eq!(detector.detect("x").await.unwrap().len(), 1);
        assert_eq!(detector.call_count(), 2);
    }
}
