//! The redaction engine: orchestration of detect → validate →
//! classify → filter → substitute, and the reverse decryption flow.

use tracing::{debug, error, info, warn};

use crate::codec::{ByteVectorCodec, TextCodec};
use crate::error::{EngineError, Result, StateError};
use crate::state::StateBlob;
use crate::store::MappingStore;
use crate::traits::{Detector, EncryptionBackend};
use crate::types::{
    EncryptionRecord, EngineConfig, Entity, MappingEntry, RedactedEntity, RedactionResult,
};
use crate::validate;

/// Placeholder token substituted for a redacted span.
///
/// Brackets plus the `ENCRYPTED_` prefix and a hex identifier cannot
/// collide with the hex alphabet of another identifier, and a
/// placeholder is exactly recoverable from the processed text.
pub fn placeholder(identifier: &str) -> String {
    format!("[ENCRYPTED_{}]", identifier)
}

/// Sentinel rendered to users when reconstruction fails. Never used as
/// a silent substitute for real content — it only accompanies an error.
pub fn decryption_sentinel(identifier: &str) -> String {
    format!("[DECRYPTION_ERROR_{}]", identifier)
}

/// Stateless-per-call redaction pipeline over shared, read-mostly
/// resources: the encryption context and the mapping store.
///
/// Two redaction calls for unrelated texts run fully independently;
/// ordering guarantees apply only within a single call.
pub struct RedactionEngine<D, B: EncryptionBackend> {
    detector: D,
    backend: B,
    context: B::Context,
    codec: Box<dyn TextCodec>,
    store: MappingStore,
    config: EngineConfig,
}

impl<D: Detector, B: EncryptionBackend> RedactionEngine<D, B> {
    /// Create an engine with the default byte codec and config.
    pub fn new(detector: D, backend: B, context: B::Context) -> Self {
        Self::with_config(detector, backend, context, EngineConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(
        detector: D,
        backend: B,
        context: B::Context,
        config: EngineConfig,
    ) -> Self {
        Self {
            detector,
            backend,
            context,
            codec: Box::new(ByteVectorCodec::new()),
            store: MappingStore::new(),
            config,
        }
    }

    /// Swap in an alternate text-vector codec strategy.
    pub fn with_codec(mut self, codec: Box<dyn TextCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn context(&self) -> &B::Context {
        &self.context
    }

    /// Detect, validate, and redact PII in `text` at or above
    /// `min_tier`. Detection failures degrade to an empty entity list.
    pub async fn redact(&self, text: &str, min_tier: u8) -> RedactionResult {
        let candidates = self.detect_with_retry(text).await;
        let entities = validate::validate_all(text, &candidates);
        self.redact_entities(text, entities, min_tier)
    }

    /// Redact a batch of texts, returning one result per input in
    /// order.
    ///
    /// Each text is processed independently: a detector failure for
    /// one text degrades that result to unredacted output and never
    /// aborts the batch. Inputs are walked in bounded chunks so large
    /// batches show progress in the logs.
    pub async fn redact_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        min_tier: u8,
    ) -> Vec<RedactionResult> {
        let chunk_size = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(texts.len());

        for (batch, chunk) in texts.chunks(chunk_size).enumerate() {
            debug!(batch, size = chunk.len(), "processing redaction batch");
            for text in chunk {
                results.push(self.redact(text.as_ref(), min_tier).await);
            }
        }

        info!(texts = texts.len(), "batch redaction complete");
        results
    }

    /// Redact pre-validated entities in `source`.
    ///
    /// Substitution runs from the highest offset to the lowest so that
    /// earlier replacements never invalidate not-yet-processed offsets;
    /// the output list is reversed back to reading order before return.
    pub fn redact_entities(
        &self,
        source: &str,
        entities: Vec<Entity>,
        min_tier: u8,
    ) -> RedactionResult {
        let total_entities = entities.len();

        let mut retained: Vec<Entity> = entities
            .iter()
            .filter(|e| e.sensitivity_tier >= min_tier)
            .cloned()
            .collect();
        retained.sort_by(|a, b| b.start.cmp(&a.start));

        let mut processed = source.to_string();
        let mut redacted_entities = Vec::with_capacity(retained.len());

        for entity in retained {
            let record = self.encrypt_entity(&entity);
            processed.replace_range(entity.start..entity.end, &placeholder(&record.identifier));

            redacted_entities.push(RedactedEntity {
                encrypted: record.is_encrypted(),
                identifier: record.identifier,
                ciphertext: record.ciphertext,
                entity,
            });
        }

        // Back to original left-to-right order for callers.
        redacted_entities.reverse();

        let encrypted_count = redacted_entities.iter().filter(|e| e.encrypted).count();
        info!(
            total = total_entities,
            retained = redacted_entities.len(),
            encrypted = encrypted_count,
            "redaction complete"
        );

        RedactionResult {
            original_text: source.to_string(),
            processed_text: processed,
            redacted_entities,
            all_entities: entities,
            total_entities,
            encrypted_count,
        }
    }

    /// Encode, encrypt, and record a single entity.
    ///
    /// A backend failure is non-fatal to the batch: the entity keeps
    /// its identifier for traceability but the ciphertext stays empty
    /// and the entity is reported as unencrypted.
    fn encrypt_entity(&self, entity: &Entity) -> EncryptionRecord {
        let identifier = entity.encryption_id();
        let vector = self
            .codec
            .encode(&entity.text, self.config.max_vector_length);

        self.store.put(
            &identifier,
            MappingEntry {
                original_text: entity.text.clone(),
                label: entity.label.clone(),
                vector_length: vector.len(),
                encoding_scheme: self.codec.scheme(),
            },
        );

        let ciphertext = match self.backend.encrypt(&self.context, &vector) {
            Ok(ciphertext) => {
                self.store.put_ciphertext(&identifier, ciphertext.clone());
                debug!(identifier = %identifier, label = %entity.label, "entity encrypted");
                ciphertext
            }
            Err(e) => {
                error!(
                    identifier = %identifier,
                    label = %entity.label,
                    error = %e,
                    "encryption failed; entity is NOT protected"
                );
                Vec::new()
            }
        };

        EncryptionRecord {
            identifier,
            ciphertext,
        }
    }

    /// Reconstruct the original text for an identifier using the
    /// store-retained ciphertext.
    pub fn decrypt(&self, identifier: &str) -> Result<String> {
        let ciphertext = match self.store.ciphertext(identifier) {
            Some(ciphertext) => ciphertext,
            None if self.store.get(identifier).is_some() => {
                return Err(EngineError::NotEncrypted {
                    identifier: identifier.to_string(),
                })
            }
            None => {
                return Err(EngineError::NotFound {
                    identifier: identifier.to_string(),
                })
            }
        };
        self.decrypt_entity(identifier, &ciphertext)
    }

    /// Reconstruct the original text from caller-supplied ciphertext.
    ///
    /// Lookup, decrypt, decode, trim — in that order, each failure
    /// surfaced as a typed error carrying the identifier.
    pub fn decrypt_entity(&self, identifier: &str, ciphertext: &[u8]) -> Result<String> {
        let entry = self
            .store
            .get(identifier)
            .ok_or_else(|| EngineError::NotFound {
                identifier: identifier.to_string(),
            })?;

        let vector = self
            .backend
            .decrypt(&self.context, ciphertext)
            .map_err(|source| EngineError::Decryption {
                identifier: identifier.to_string(),
                source,
            })?;

        let original_chars = entry.original_text.chars().count();
        let text = self
            .codec
            .decode(&vector, original_chars, entry.encoding_scheme)
            .map_err(|source| EngineError::Decode {
                identifier: identifier.to_string(),
                source,
            })?;

        Ok(text)
    }

    /// Export the full recoverable state as an opaque versioned blob.
    ///
    /// The blob contains the context's public portion and the mapping
    /// store; secret key material is structurally absent.
    pub fn export_state(&self) -> Result<String> {
        let context_bytes = self.backend.serialize_context(&self.context);
        let (entries, ciphertexts) = self.store.snapshot();
        let blob = StateBlob::assemble(&context_bytes, entries, ciphertexts);
        Ok(blob.to_json().map_err(EngineError::State)?)
    }

    /// Restore mapping state from an exported blob.
    ///
    /// The blob's context fingerprint must match the live context;
    /// entries exported under a different context would decrypt to
    /// garbage and are rejected wholesale. Returns the number of
    /// entries actually added (existing entries are never overwritten).
    pub fn import_state(&self, blob: &str) -> Result<usize> {
        let state = StateBlob::from_json(blob).map_err(EngineError::State)?;

        let imported_context = self
            .backend
            .deserialize_context(&state.context_bytes().map_err(EngineError::State)?)
            .map_err(|_| {
                EngineError::State(StateError::ContextMismatch {
                    expected: self.backend.fingerprint(&self.context),
                    found: "<unreadable>".to_string(),
                })
            })?;

        let expected = self.backend.fingerprint(&self.context);
        let found = self.backend.fingerprint(&imported_context);
        if expected != found {
            return Err(EngineError::State(StateError::ContextMismatch {
                expected,
                found,
            }));
        }

        let ciphertexts = state.decoded_ciphertexts().map_err(EngineError::State)?;
        let restored = self.store.restore(state.entries, ciphertexts);
        info!(restored, "state import complete");
        Ok(restored)
    }

    /// Call the detector with bounded retries and a short backoff,
    /// degrading to an empty candidate list on exhaustion.
    async fn detect_with_retry(&self, text: &str) -> Vec<crate::types::CandidateEntity> {
        let attempts = self.config.detect_attempts.max(1);
        for attempt in 1..=attempts {
            match self.detector.detect(text).await {
                Ok(candidates) => {
                    debug!(count = candidates.len(), "detector returned candidates");
                    return candidates;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "detector attempt failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.detect_backoff).await;
                    }
                }
            }
        }

        error!(attempts, "detector exhausted retries; proceeding without entities");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SealedBackend, SealedContext};
    use crate::testing::{FailingBackend, MockDetector};
    use crate::types::{CandidateEntity, SealParams};

    fn engine_with(
        detector: MockDetector,
    ) -> RedactionEngine<MockDetector, SealedBackend> {
        let context = SealedContext::generate(SealParams::default());
        RedactionEngine::new(detector, SealedBackend::new(), context)
    }

    fn candidate(text: &str, label: &str, start: usize, end: usize) -> CandidateEntity {
        CandidateEntity {
            text: text.to_string(),
            label: label.to_string(),
            start,
            end,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_concrete_scenario_round_trip() {
        let source = "Contact alice@x.com at 555-1234.";
        let detector = MockDetector::new().with_response(vec![
            candidate("alice@x.com", "EMAIL", 8, 19),
            candidate("555-1234", "PHONE", 23, 31),
        ]);
        let engine = engine_with(detector);

        let result = engine.redact(source, 2).await;

        assert_eq!(result.total_entities, 2);
        assert_eq!(result.encrypted_count, 2);
        assert_eq!(result.redacted_entities.len(), 2);
        assert_eq!(result.processed_text.matches("[ENCRYPTED_").count(), 2);
        assert!(!result.processed_text.contains("alice@x.com"));
        assert!(!result.processed_text.contains("555-1234"));

        // Both identifiers resolve back to their original text.
        let email_id = &result.redacted_entities[0].identifier;
        let phone_id = &result.redacted_entities[1].identifier;
        assert_eq!(engine.decrypt(email_id).unwrap(), "alice@x.com");
        assert_eq!(engine.decrypt(phone_id).unwrap(), "555-1234");
    }

    #[tokio::test]
    async fn test_substitution_order_invariance() {
        let source = "aaaa bbbbb cccc ddddd eeee";
        let forward = vec![
            candidate("bbbbb", "EMAIL", 5, 10),
            candidate("ddddd", "PHONE", 16, 21),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let engine_a = engine_with(MockDetector::new().with_response(forward));
        let engine_b = engine_with(MockDetector::new().with_response(reversed));

        let a = engine_a.redact(source, 2).await;
        let b = engine_b.redact(source, 2).await;
        assert_eq!(a.processed_text, b.processed_text);
    }

    #[tokio::test]
    async fn test_placeholder_order_matches_reading_order() {
        let source = "x alice@x.com y 555-1234 z";
        let detector = MockDetector::new().with_response(vec![
            candidate("555-1234", "PHONE", 16, 24),
            candidate("alice@x.com", "EMAIL", 2, 13),
        ]);
        let engine = engine_with(detector);
        let result = engine.redact(source, 2).await;

        // Returned entities in ascending start order.
        assert_eq!(result.redacted_entities[0].entity.text, "alice@x.com");
        assert_eq!(result.redacted_entities[1].entity.text, "555-1234");

        // Placeholders appear in the same order in the processed text.
        let first = result
            .processed_text
            .find(&placeholder(&result.redacted_entities[0].identifier))
            .unwrap();
        let second = result
            .processed_text
            .find(&placeholder(&result.redacted_entities[1].identifier))
            .unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_tier_filtering() {
        let source = "John Smith's SSN is 123-45-6789.";
        let detector = MockDetector::new().with_response(vec![
            candidate("John Smith", "PERSON", 0, 10),       // tier 1
            candidate("123-45-6789", "SSN", 20, 31),        // tier 3
        ]);
        let engine = engine_with(detector);
        let result = engine.redact(source, 3).await;

        assert_eq!(result.total_entities, 2);
        assert_eq!(result.redacted_entities.len(), 1);
        assert_eq!(result.redacted_entities[0].entity.label, "SSN");
        assert!(result
            .redacted_entities
            .iter()
            .all(|e| e.entity.sensitivity_tier >= 3));

        // The low-tier entity is still audited, untouched.
        assert_eq!(result.all_entities.len(), 2);
        assert!(result.processed_text.contains("John Smith"));
    }

    #[tokio::test]
    async fn test_text_outside_spans_untouched() {
        let source = "Contact alice@x.com at 555-1234.";
        let detector = MockDetector::new().with_response(vec![
            candidate("alice@x.com", "EMAIL", 8, 19),
            candidate("555-1234", "PHONE", 23, 31),
        ]);
        let engine = engine_with(detector);
        let result = engine.redact(source, 2).await;

        assert!(result.processed_text.starts_with("Contact "));
        assert!(result.processed_text.contains(" at "));
        assert!(result.processed_text.ends_with('.'));
    }

    #[tokio::test]
    async fn test_batch_redaction_preserves_order_and_isolation() {
        let texts = vec![
            "Contact alice@x.com now".to_string(),
            "nothing sensitive here".to_string(),
        ];
        let detector =
            MockDetector::new().with_response(vec![candidate("alice@x.com", "EMAIL", 8, 19)]);
        let engine = engine_with(detector);

        let results = engine.redact_batch(&texts, 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].redacted_entities.len(), 1);
        assert!(results[0].processed_text.contains("[ENCRYPTED_"));

        // The candidate text does not occur in the second input, so it
        // is dropped there and the text passes through untouched.
        assert!(results[1].redacted_entities.is_empty());
        assert_eq!(results[1].processed_text, "nothing sensitive here");
    }

    #[tokio::test]
    async fn test_batch_detector_failure_degrades_per_text() {
        let detector = MockDetector::new().failing();
        let context = SealedContext::generate(SealParams::default());
        let config = EngineConfig::default()
            .with_detect_attempts(1)
            .with_batch_size(1);
        let engine =
            RedactionEngine::with_config(detector, SealedBackend::new(), context, config);

        let texts = vec!["a@b.com".to_string(), "c@d.com".to_string()];
        let results = engine.redact_batch(&texts, 1).await;

        // One failed text yields an empty result, not a batch abort.
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.redacted_entities.is_empty()));
        assert_eq!(results[0].processed_text, "a@b.com");
        assert_eq!(results[1].processed_text, "c@d.com");
    }

    #[tokio::test]
    async fn test_detector_failure_degrades_to_empty() {
        let detector = MockDetector::new().failing();
        let context = SealedContext::generate(SealParams::default());
        let config = EngineConfig::default()
            .with_detect_attempts(2)
            .with_detect_backoff(std::time::Duration::from_millis(1));
        let engine =
            RedactionEngine::with_config(detector, SealedBackend::new(), context, config);

        let result = engine.redact("some text with a@b.com", 1).await;
        assert_eq!(result.total_entities, 0);
        assert_eq!(result.processed_text, "some text with a@b.com");
        assert_eq!(engine.detector.call_count(), 2);
    }

    #[tokio::test]
    async fn test_detector_retry_then_success() {
        let detector = MockDetector::new()
            .with_response(vec![candidate("a@b.com", "EMAIL", 15, 22)])
            .fail_times(1);
        let context = SealedContext::generate(SealParams::default());
        let config = EngineConfig::default()
            .with_detect_backoff(std::time::Duration::from_millis(1));
        let engine =
            RedactionEngine::with_config(detector, SealedBackend::new(), context, config);

        let result = engine.redact("some text with a@b.com", 1).await;
        assert_eq!(result.redacted_entities.len(), 1);
    }

    #[tokio::test]
    async fn test_encryption_failure_is_nonfatal_and_visible() {
        let source = "Contact alice@x.com now";
        let detector =
            MockDetector::new().with_response(vec![candidate("alice@x.com", "EMAIL", 8, 19)]);
        let context = SealedContext::generate(SealParams::default());
        let engine = RedactionEngine::new(detector, FailingBackend::new(), context);

        let result = engine.redact(source, 2).await;

        // Placeholder substituted, identifier assigned, but reported
        // unencrypted and excluded from the encrypted count.
        assert_eq!(result.redacted_entities.len(), 1);
        assert!(!result.redacted_entities[0].encrypted);
        assert_eq!(result.encrypted_count, 0);
        assert!(result.processed_text.contains("[ENCRYPTED_"));

        let id = &result.redacted_entities[0].identifier;
        assert!(matches!(
            engine.decrypt(id),
            Err(EngineError::NotEncrypted { .. })
        ));
    }

    #[tokio::test]
    async fn test_decrypt_unknown_identifier_is_not_found() {
        let engine = engine_with(MockDetector::new());
        assert!(matches!(
            engine.decrypt("deadbeefdeadbeef"),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cross_context_decryption_fails() {
        let source = "Contact alice@x.com now";
        let detector =
            MockDetector::new().with_response(vec![candidate("alice@x.com", "EMAIL", 8, 19)]);
        let engine = engine_with(detector);
        let result = engine.redact(source, 2).await;
        let redacted = &result.redacted_entities[0];

        // A second engine with its own context and the same mapping
        // entry must reject the ciphertext, never produce a plausible
        // wrong string.
        let other = engine_with(MockDetector::new());
        other.store().put(
            &redacted.identifier,
            engine.store().get(&redacted.identifier).unwrap(),
        );
        let err = other
            .decrypt_entity(&redacted.identifier, &redacted.ciphertext)
            .unwrap_err();
        assert!(matches!(err, EngineError::Decryption { .. }));
    }

    #[tokio::test]
    async fn test_export_import_state() {
        let source = "Contact alice@x.com now";
        let detector =
            MockDetector::new().with_response(vec![candidate("alice@x.com", "EMAIL", 8, 19)]);
        let context = SealedContext::generate(SealParams::default());
        let restored_context = context.clone();
        let engine = RedactionEngine::new(detector, SealedBackend::new(), context);

        let result = engine.redact(source, 2).await;
        let identifier = result.redacted_entities[0].identifier.clone();

        let blob = engine.export_state().unwrap();
        let parsed = crate::state::StateBlob::from_json(&blob).unwrap();
        let public = String::from_utf8(parsed.context_bytes().unwrap()).unwrap();
        assert!(!public.contains("key"), "export must not carry key material");

        // Fresh engine sharing the same context: import then decrypt.
        let restored =
            RedactionEngine::new(MockDetector::new(), SealedBackend::new(), restored_context);
        let count = restored.import_state(&blob).unwrap();
        assert_eq!(count, 1);
        assert_eq!(restored.decrypt(&identifier).unwrap(), "alice@x.com");
    }

    #[tokio::test]
    async fn test_import_rejects_foreign_context() {
        let engine = engine_with(
            MockDetector::new().with_response(vec![candidate("a@b.com", "EMAIL", 0, 7)]),
        );
        engine.redact("a@b.com", 2).await;
        let blob = engine.export_state().unwrap();

        let other = engine_with(MockDetector::new());
        let err = other.import_state(&blob).unwrap_err();
        assert!(matches!(
            err,
            EngineError::State(StateError::ContextMismatch { .. })
        ));
    }
}
