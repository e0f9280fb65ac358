//! Configuration types for the engine and the sealing context.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the redaction engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed vector width for the text codec.
    ///
    /// Entity text longer than this (in bytes) is silently truncated;
    /// callers must not assume full fidelity for longer entities.
    /// Default: 100.
    pub max_vector_length: usize,

    /// Bounded retry count for the external detector.
    ///
    /// Detection is best-effort: after this many failed attempts a
    /// redaction call proceeds with an empty entity list.
    /// Default: 3.
    pub detect_attempts: u32,

    /// Backoff between detector attempts. Default: 500ms.
    pub detect_backoff: Duration,

    /// Chunk size for batch redaction. Default: 5.
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_vector_length: 100,
            detect_attempts: 3,
            detect_backoff: Duration::from_millis(500),
            batch_size: 5,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed codec vector width.
    pub fn with_max_vector_length(mut self, len: usize) -> Self {
        self.max_vector_length = len;
        self
    }

    /// Set the detector retry budget.
    pub fn with_detect_attempts(mut self, attempts: u32) -> Self {
        self.detect_attempts = attempts;
        self
    }

    /// Set the backoff between detector attempts.
    pub fn with_detect_backoff(mut self, backoff: Duration) -> Self {
        self.detect_backoff = backoff;
        self
    }

    /// Set the batch redaction chunk size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// Cryptographic parameter set for the sealing context.
///
/// Every ciphertext must be decrypted under byte-identical parameters
/// to the context that produced it; the params participate in the
/// context fingerprint embedded in each ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealParams {
    pub poly_modulus_degree: usize,
    pub coeff_mod_bit_sizes: Vec<u32>,
    pub scale: f64,
}

impl Default for SealParams {
    fn default() -> Self {
        Self {
            poly_modulus_degree: 8192,
            coeff_mod_bit_sizes: vec![60, 40, 40, 60],
            scale: 2.0_f64.powi(40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_vector_length, 100);
        assert_eq!(config.detect_attempts, 3);
        assert_eq!(config.batch_size, 5);

        let params = SealParams::default();
        assert_eq!(params.poly_modulus_degree, 8192);
        assert_eq!(params.coeff_mod_bit_sizes, vec![60, 40, 40, 60]);
    }
}
