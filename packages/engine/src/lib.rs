//! Selective Redaction & Recoverable Encryption Engine
//!
//! Detects sensitive entities in free text, replaces each with an
//! opaque placeholder, and encrypts the original content so that it
//! remains recoverable by identifier. The redacted text is safe to
//! hand to downstream systems; the mapping store plus the encryption
//! context are all that is needed to reverse any individual redaction.
//!
//! # Design Philosophy
//!
//! **"Degrade loudly, never silently"**
//!
//! - Detection is best-effort: a failed detector yields unredacted
//!   text plus an error log, never a crash
//! - Encryption failures leave the placeholder in place and mark the
//!   entity as unprotected in the result
//! - Decryption failures surface as typed errors, never as plausible
//!   wrong text
//! - Exports never carry key material, structurally
//!
//! # Usage
//!
//! ```rust,ignore
//! use pii_engine::{RedactionEngine, SealedBackend, SealedContext, SealParams};
//! use pii_engine::detectors::LlmDetector;
//!
//! let detector = LlmDetector::from_env("gpt-4o-mini")?;
//! let context = SealedContext::generate(SealParams::default());
//! let engine = RedactionEngine::new(detector, SealedBackend::new(), context);
//!
//! let result = engine.redact("Contact alice@example.com", 1).await;
//! for entity in &result.redacted_entities {
//!     let original = engine.decrypt(&entity.identifier)?;
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Detector, EncryptionBackend)
//! - [`types`] - Entity, mapping, and configuration types
//! - [`engine`] - The redaction/decryption orchestrator
//! - [`validate`] - Entity offset validation and repair
//! - [`policy`] - Label to sensitivity tier classification
//! - [`codec`] - Text to numeric-vector encoding
//! - [`backend`] - Encryption backend implementations
//! - [`detectors`] - Detector implementations (LlmDetector)
//! - [`store`] - In-memory mapping store
//! - [`state`] - Versioned export/import blobs
//! - [`testing`] - Mock implementations for testing

pub mod backend;
pub mod codec;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod policy;
pub mod state;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use backend::{SealedBackend, SealedContext};
pub use codec::{ByteVectorCodec, EncodingScheme, TextCodec};
pub use engine::{decryption_sentinel, placeholder, RedactionEngine};
pub use error::{
    CodecError, CryptoError, DetectError, EngineError, Result, StateError,
};
pub use state::{StateBlob, STATE_VERSION};
pub use store::MappingStore;
pub use traits::{Detector, EncryptionBackend};
pub use types::{
    CandidateEntity, EngineConfig, Entity, MappingEntry, RedactedEntity, RedactionResult,
    SealParams,
};
