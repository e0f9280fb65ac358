//! PII entity types and encryption metadata.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::EncodingScheme;

/// A raw entity candidate as reported by the external detector.
///
/// Offsets are untrusted: detectors routinely report spans that are off
/// by encoding differences or model error. Candidates only become
/// [`Entity`] values after validation against the source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

/// A validated PII span within a source text.
///
/// Invariant: `source[start..end] == text` (byte offsets). Established
/// by the validator and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
    pub confidence: f64,
    /// Derived from the sensitivity policy, 1 (low) to 3 (high).
    pub sensitivity_tier: u8,
}

impl Entity {
    /// Content-addressed identifier for this entity's encryption.
    pub fn encryption_id(&self) -> String {
        encryption_id(&self.text, &self.label, self.start, self.end)
    }
}

/// Stable short identifier derived from entity content and position.
///
/// Identical entities at identical offsets deliberately collide: the
/// mapping store is content-addressed, so repeated PII across messages
/// resolves through one entry.
pub fn encryption_id(text: &str, label: &str, start: usize, end: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}_{}_{}", text, label, start, end));
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Ciphertext attached to an entity once encrypted. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionRecord {
    pub identifier: String,
    /// Opaque backend ciphertext. Empty when encryption failed; such
    /// entities are traceable by identifier but are NOT protected.
    pub ciphertext: Vec<u8>,
}

impl EncryptionRecord {
    /// Whether this record actually carries a ciphertext.
    pub fn is_encrypted(&self) -> bool {
        !self.ciphertext.is_empty()
    }
}

/// An entity that went through the redaction path, with its record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedEntity {
    #[serde(flatten)]
    pub entity: Entity,
    pub identifier: String,
    #[serde(skip)]
    pub ciphertext: Vec<u8>,
    /// False when the backend failed for this entity; the placeholder
    /// was still substituted but confidentiality is NOT guaranteed.
    pub encrypted: bool,
}

/// Metadata needed to reconstruct plaintext from a decrypted vector.
///
/// Keyed by identifier in the mapping store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub original_text: String,
    pub label: String,
    pub vector_length: usize,
    pub encoding_scheme: EncodingScheme,
}

/// Output of a redaction call.
#[derive(Debug, Clone, Serialize)]
pub struct RedactionResult {
    pub original_text: String,
    /// Source text with each retained entity replaced by its
    /// `[ENCRYPTED_{id}]` placeholder, otherwise byte-identical.
    pub processed_text: String,
    /// Retained (tier-filtered) entities in reading order.
    pub redacted_entities: Vec<RedactedEntity>,
    /// Every validated entity, including those below the tier cutoff,
    /// for auditing. Below-cutoff entities are never encrypted.
    pub all_entities: Vec<Entity>,
    pub total_entities: usize,
    /// Number of retained entities whose encryption actually succeeded.
    pub encrypted_count: usize,
}
