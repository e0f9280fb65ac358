//! Sealed-vector backend: AES-256-GCM over the slot encoding.
//!
//! One implementation of the [`EncryptionBackend`] capability. It is
//! not a homomorphic scheme — it seals the little-endian `f64` slot
//! bytes under a process-wide key — but it satisfies the engine's
//! contract exactly: deterministic round trip, opaque ciphertext, and
//! loud failure under a mismatched context. A CKKS binding can replace
//! it without touching the engine.
//!
//! Ciphertext layout: `fingerprint(8) || nonce(12) || aead_ciphertext`.
//! The fingerprint prefix lets a mismatched context be rejected with a
//! precise error before AEAD open; a forged prefix still fails
//! authentication.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};
use crate::traits::EncryptionBackend;
use crate::types::SealParams;

const FINGERPRINT_LEN: usize = 8;
const NONCE_LEN: usize = 12;

/// Process-wide sealing context: parameters, fingerprint, and (for
/// contexts generated locally rather than deserialized) the secret key.
///
/// Read-mostly and shared across all encrypt/decrypt calls; `Clone` is
/// cheap and keeps the same key, so clones stay mutually compatible.
#[derive(Clone)]
pub struct SealedContext {
    params: SealParams,
    fingerprint: [u8; FINGERPRINT_LEN],
    /// `None` for contexts restored from a public serialization; such
    /// contexts can verify fingerprints but never decrypt.
    key: Option<[u8; 32]>,
}

/// Public portion of a context, the only thing ever serialized.
#[derive(Serialize, Deserialize)]
struct PublicContext {
    params: SealParams,
    fingerprint: String,
}

impl SealedContext {
    /// Generate a fresh context with a random key.
    pub fn generate(params: SealParams) -> Self {
        use rand::Rng;
        let mut key = [0u8; 32];
        rand::thread_rng().fill(&mut key[..]);

        let fingerprint = compute_fingerprint(&params, &key);
        Self {
            params,
            fingerprint,
            key: Some(key),
        }
    }

    /// Reconstruct a decrypting context from explicit key material,
    /// e.g. a key loaded from a secrets manager after an import.
    pub fn from_key(params: SealParams, key: [u8; 32]) -> Self {
        let fingerprint = compute_fingerprint(&params, &key);
        Self {
            params,
            fingerprint,
            key: Some(key),
        }
    }

    pub fn params(&self) -> &SealParams {
        &self.params
    }

    /// Whether this context can decrypt (holds key material).
    pub fn has_secret_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn fingerprint_hex(&self) -> String {
        hex_encode(&self.fingerprint)
    }
}

impl std::fmt::Debug for SealedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedContext")
            .field("params", &self.params)
            .field("fingerprint", &self.fingerprint_hex())
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn compute_fingerprint(params: &SealParams, key: &[u8; 32]) -> [u8; FINGERPRINT_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(params.poly_modulus_degree.to_le_bytes());
    for size in &params.coeff_mod_bit_sizes {
        hasher.update(size.to_le_bytes());
    }
    hasher.update(params.scale.to_le_bytes());
    let digest = hasher.finalize();

    let mut fingerprint = [0u8; FINGERPRINT_LEN];
    fingerprint.copy_from_slice(&digest[..FINGERPRINT_LEN]);
    fingerprint
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// The sealed-vector backend. Stateless; all state lives in the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealedBackend;

impl SealedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EncryptionBackend for SealedBackend {
    type Context = SealedContext;

    fn encrypt(&self, context: &SealedContext, vector: &[f64]) -> CryptoResult<Vec<u8>> {
        let key = context.key.ok_or(CryptoError::MissingSecretKey)?;

        let mut plaintext = Vec::with_capacity(vector.len() * 8);
        for slot in vector {
            plaintext.extend_from_slice(&slot.to_le_bytes());
        }

        use rand::Rng;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let sealed = cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        let mut ciphertext =
            Vec::with_capacity(FINGERPRINT_LEN + NONCE_LEN + sealed.len());
        ciphertext.extend_from_slice(&context.fingerprint);
        ciphertext.extend_from_slice(&nonce_bytes);
        ciphertext.extend_from_slice(&sealed);
        Ok(ciphertext)
    }

    fn decrypt(&self, context: &SealedContext, ciphertext: &[u8]) -> CryptoResult<Vec<f64>> {
        if ciphertext.len() < FINGERPRINT_LEN + NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext(ciphertext.len()));
        }

        let (header, rest) = ciphertext.split_at(FINGERPRINT_LEN);
        if header != context.fingerprint {
            return Err(CryptoError::ContextMismatch {
                expected: context.fingerprint_hex(),
                found: hex_encode(header),
            });
        }

        let key = context.key.ok_or(CryptoError::MissingSecretKey)?;
        let (nonce_bytes, sealed) = rest.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let plaintext = cipher
            .decrypt(nonce, sealed)
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        if plaintext.len() % 8 != 0 {
            return Err(CryptoError::MalformedCiphertext(ciphertext.len()));
        }

        Ok(plaintext
            .chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                f64::from_le_bytes(bytes)
            })
            .collect())
    }

    fn serialize_context(&self, context: &SealedContext) -> Vec<u8> {
        // PublicContext has no key field at all; exclusion of key
        // material is structural, not a filtering step.
        let public = PublicContext {
            params: context.params.clone(),
            fingerprint: context.fingerprint_hex(),
        };
        serde_json::to_vec(&public).expect("public context serialization is infallible")
    }

    fn deserialize_context(&self, bytes: &[u8]) -> CryptoResult<SealedContext> {
        let public: PublicContext = serde_json::from_slice(bytes)
            .map_err(|_| CryptoError::MalformedCiphertext(bytes.len()))?;

        let mut fingerprint = [0u8; FINGERPRINT_LEN];
        let decoded: Vec<u8> = (0..public.fingerprint.len())
            .step_by(2)
            .filter_map(|i| u8::from_str_radix(public.fingerprint.get(i..i + 2)?, 16).ok())
            .collect();
        if decoded.len() != FINGERPRINT_LEN {
            return Err(CryptoError::MalformedCiphertext(bytes.len()));
        }
        fingerprint.copy_from_slice(&decoded);

        Ok(SealedContext {
            params: public.params,
            fingerprint,
            key: None,
        })
    }

    fn fingerprint(&self, context: &SealedContext) -> String {
        context.fingerprint_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let backend = SealedBackend::new();
        let context = SealedContext::generate(SealParams::default());

        let vector = vec![0.5, 0.25, 0.0, 1.0];
        let ciphertext = backend.encrypt(&context, &vector).unwrap();
        let decrypted = backend.decrypt(&context, &ciphertext).unwrap();
        assert_eq!(decrypted, vector);
    }

    #[test]
    fn test_cross_context_decryption_rejected() {
        let backend = SealedBackend::new();
        let context_a = SealedContext::generate(SealParams::default());
        let context_b = SealedContext::generate(SealParams::default());

        let ciphertext = backend.encrypt(&context_a, &[0.5; 4]).unwrap();
        let err = backend.decrypt(&context_b, &ciphertext).unwrap_err();
        assert!(matches!(err, CryptoError::ContextMismatch { .. }));
    }

    #[test]
    fn test_forged_fingerprint_fails_authentication() {
        let backend = SealedBackend::new();
        let context_a = SealedContext::generate(SealParams::default());
        let context_b = SealedContext::generate(SealParams::default());

        // Splice context B's fingerprint onto context A's ciphertext.
        let mut ciphertext = backend.encrypt(&context_a, &[0.5; 4]).unwrap();
        ciphertext[..FINGERPRINT_LEN].copy_from_slice(&context_b.fingerprint);

        let err = backend.decrypt(&context_b, &ciphertext).unwrap_err();
        assert!(matches!(err, CryptoError::AuthenticationFailed));
    }

    #[test]
    fn test_truncated_ciphertext_is_malformed() {
        let backend = SealedBackend::new();
        let context = SealedContext::generate(SealParams::default());
        let err = backend.decrypt(&context, &[0u8; 5]).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedCiphertext(5)));
    }

    #[test]
    fn test_serialized_context_carries_no_key() {
        let backend = SealedBackend::new();
        let context = SealedContext::generate(SealParams::default());

        let bytes = backend.serialize_context(&context);
        let restored = backend.deserialize_context(&bytes).unwrap();

        assert!(!restored.has_secret_key());
        assert_eq!(restored.fingerprint_hex(), context.fingerprint_hex());

        // A restored context must refuse to decrypt, not guess.
        let ciphertext = backend.encrypt(&context, &[0.5]).unwrap();
        let err = backend.decrypt(&restored, &ciphertext).unwrap_err();
        assert!(matches!(err, CryptoError::MissingSecretKey));
    }

    #[test]
    fn test_from_key_reproduces_fingerprint() {
        let key = [7u8; 32];
        let a = SealedContext::from_key(SealParams::default(), key);
        let b = SealedContext::from_key(SealParams::default(), key);
        assert_eq!(a.fingerprint_hex(), b.fingerprint_hex());
    }

    #[test]
    fn test_debug_redacts_key() {
        let context = SealedContext::generate(SealParams::default());
        let debug = format!("{:?}", context);
        assert!(debug.contains("<redacted>"));
    }
}
