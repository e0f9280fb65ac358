//! Encryption backend capability consumed by the redaction engine.

use crate::error::CryptoResult;

/// A scheme that can encrypt fixed-length real vectors under a shared,
/// process-wide context.
///
/// The engine is polymorphic over this capability: any scheme exposing
/// encrypt/decrypt over `[f64]` slots satisfies it, a homomorphic one
/// included. Context setup (parameter selection, key generation)
/// happens once per process; the engine never creates per-entity keys.
pub trait EncryptionBackend: Send + Sync {
    /// The cryptographic context: parameter set plus key material.
    type Context: Send + Sync;

    /// Encrypt a slot vector, producing opaque ciphertext bytes.
    fn encrypt(&self, context: &Self::Context, vector: &[f64]) -> CryptoResult<Vec<u8>>;

    /// Decrypt ciphertext bytes back to the slot vector.
    ///
    /// Must fail loudly (never silently produce garbage) when the
    /// ciphertext was produced under a different context.
    fn decrypt(&self, context: &Self::Context, ciphertext: &[u8]) -> CryptoResult<Vec<f64>>;

    /// Serialize the context's public portion. Key material is never
    /// included; the result is safe for untrusted storage.
    fn serialize_context(&self, context: &Self::Context) -> Vec<u8>;

    /// Restore a context from its serialized public portion. The
    /// result can verify fingerprints but cannot decrypt.
    fn deserialize_context(&self, bytes: &[u8]) -> CryptoResult<Self::Context>;

    /// Short stable fingerprint identifying the context's parameters
    /// and key. Embedded in ciphertexts for mismatch rejection.
    fn fingerprint(&self, context: &Self::Context) -> String;
}
