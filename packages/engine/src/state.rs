//! Versioned state blob: public context + full mapping store.
//!
//! The blob is an opaque container for persistence; no external format
//! compatibility is promised beyond round-tripping within the same
//! engine version. Key material never appears in it — the serialized
//! context is the backend's public portion only.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::types::MappingEntry;

/// Current blob format version.
pub const STATE_VERSION: u32 = 1;

/// The serialized form of an engine's recoverable state.
#[derive(Debug, Serialize, Deserialize)]
pub struct StateBlob {
    pub version: u32,
    /// Base64 of the backend's public context serialization.
    pub context: String,
    pub entries: HashMap<String, MappingEntry>,
    /// Base64 ciphertext bytes per identifier.
    pub ciphertexts: HashMap<String, String>,
}

impl StateBlob {
    /// Assemble a blob from a store snapshot and serialized context.
    pub fn assemble(
        context_bytes: &[u8],
        entries: HashMap<String, MappingEntry>,
        ciphertexts: HashMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            version: STATE_VERSION,
            context: BASE64.encode(context_bytes),
            entries,
            ciphertexts: ciphertexts
                .into_iter()
                .map(|(id, bytes)| (id, BASE64.encode(bytes)))
                .collect(),
        }
    }

    /// Serialize to the opaque JSON wire form.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the wire form, rejecting unknown versions.
    pub fn from_json(blob: &str) -> Result<Self, StateError> {
        let state: StateBlob = serde_json::from_str(blob)?;
        if state.version != STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                found: state.version,
            });
        }
        Ok(state)
    }

    /// Decode the serialized context bytes.
    pub fn context_bytes(&self) -> Result<Vec<u8>, StateError> {
        Ok(BASE64.decode(&self.context)?)
    }

    /// Decode all ciphertexts back to raw bytes.
    pub fn decoded_ciphertexts(&self) -> Result<HashMap<String, Vec<u8>>, StateError> {
        self.ciphertexts
            .iter()
            .map(|(id, encoded)| Ok((id.clone(), BASE64.decode(encoded)?)))
            .collect()
    }
}
