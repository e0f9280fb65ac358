//! Typed errors for the redaction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep the
//! failure taxonomy explicit: per-entity failures never abort a batch,
//! decryption failures are always surfaced to the caller.

use thiserror::Error;

/// Errors surfaced by engine-level operations (decrypt, state I/O).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No mapping entry exists for this identifier. Normal and expected
    /// for identifiers minted by a different process; distinct from a
    /// decryption failure.
    #[error("no mapping entry for identifier: {identifier}")]
    NotFound { identifier: String },

    /// The stored ciphertext could not be decrypted. Carries the
    /// identifier so the caller can display a clear fault instead of
    /// wrong content.
    #[error("decryption failed for {identifier}: {source}")]
    Decryption {
        identifier: String,
        #[source]
        source: CryptoError,
    },

    /// The entity has a mapping entry but no ciphertext: the backend
    /// failed at redaction time and the entity was never protected.
    #[error("entity {identifier} was never encrypted")]
    NotEncrypted { identifier: String },

    /// The decrypted vector could not be turned back into text, even
    /// via the ASCII fallback.
    #[error("decode failed for {identifier}: {source}")]
    Decode {
        identifier: String,
        #[source]
        source: CodecError,
    },

    /// State blob import/export failed.
    #[error("state error: {0}")]
    State(#[from] StateError),
}

/// Errors from the encryption backend capability.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Ciphertext was produced under a different context. Cross-context
    /// decryption is undefined and must fail loudly.
    #[error("context mismatch: ciphertext fingerprint {found}, context fingerprint {expected}")]
    ContextMismatch { expected: String, found: String },

    /// The context holds no secret key (e.g. it was deserialized from
    /// an export, which never carries key material).
    #[error("context has no secret key")]
    MissingSecretKey,

    /// AEAD authentication failed — wrong key or corrupted ciphertext.
    #[error("ciphertext authentication failed")]
    AuthenticationFailed,

    /// Ciphertext bytes are too short or structurally invalid.
    #[error("malformed ciphertext ({0} bytes)")]
    MalformedCiphertext(usize),
}

/// Errors from the text-vector codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Neither the primary decoding nor the ASCII fallback produced
    /// any text for a non-empty original.
    #[error("vector decoded to nothing (expected {expected_chars} chars)")]
    EmptyDecode { expected_chars: usize },
}

/// Errors from the external entity detector.
///
/// These never escape a redaction call: detection is best-effort and
/// degrades to an empty entity list after bounded retries.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Detector client configuration problem (missing API key, etc.).
    #[error("detector config error: {0}")]
    Config(String),

    /// HTTP transport failure talking to the detector service.
    #[error("detector request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The detector returned a non-success status.
    #[error("detector returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// No parseable JSON entity array in the response.
    #[error("unparseable detector response: {0}")]
    MalformedResponse(String),
}

/// Errors from state blob serialization/deserialization.
#[derive(Debug, Error)]
pub enum StateError {
    /// Blob version is not one this engine version can read.
    #[error("unsupported state blob version: {found}")]
    UnsupportedVersion { found: u32 },

    /// Blob JSON is invalid.
    #[error("state blob parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ciphertext bytes in the blob are not valid base64.
    #[error("state blob base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The blob was exported under a different context than the one
    /// this engine is running with.
    #[error("state blob context fingerprint {found} does not match live context {expected}")]
    ContextMismatch { expected: String, found: String },
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for backend operations.
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

/// Result type alias for detector operations.
pub type DetectResult<T> = std::result::Result<T, DetectError>;
