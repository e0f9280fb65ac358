//! In-memory mapping store: identifier → reconstruction metadata.
//!
//! Insert-only workload shared across concurrent redaction calls, so a
//! plain `RwLock` (exclusive write, shared read) is enough; existing
//! entries are never mutated in place.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::MappingEntry;

/// Durable (process-lifetime) identifier → metadata store.
///
/// Also retains ciphertext bytes per identifier so `decrypt(identifier)`
/// works for callers that do not transport ciphertext themselves.
#[derive(Default)]
pub struct MappingStore {
    entries: RwLock<HashMap<String, MappingEntry>>,
    ciphertexts: RwLock<HashMap<String, Vec<u8>>>,
}

impl MappingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping entry. Idempotent for identical content:
    /// identifiers are content-addressed, so a repeat of the same
    /// entity resolves to the same entry.
    pub fn put(&self, identifier: &str, entry: MappingEntry) {
        self.entries
            .write()
            .unwrap()
            .entry(identifier.to_string())
            .or_insert(entry);
    }

    /// Look up a mapping entry. `None` is a normal, expected outcome
    /// (e.g. an identifier minted by a different process).
    pub fn get(&self, identifier: &str) -> Option<MappingEntry> {
        self.entries.read().unwrap().get(identifier).cloned()
    }

    /// Retain ciphertext bytes for an identifier.
    pub fn put_ciphertext(&self, identifier: &str, ciphertext: Vec<u8>) {
        self.ciphertexts
            .write()
            .unwrap()
            .entry(identifier.to_string())
            .or_insert(ciphertext);
    }

    /// Retrieve retained ciphertext bytes for an identifier.
    pub fn ciphertext(&self, identifier: &str) -> Option<Vec<u8>> {
        self.ciphertexts.read().unwrap().get(identifier).cloned()
    }

    /// Number of stored mapping entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Snapshot the full store for state export.
    pub fn snapshot(&self) -> (HashMap<String, MappingEntry>, HashMap<String, Vec<u8>>) {
        (
            self.entries.read().unwrap().clone(),
            self.ciphertexts.read().unwrap().clone(),
        )
    }

    /// Merge a snapshot back in (state import). Existing entries win;
    /// the store stays insert-only.
    pub fn restore(
        &self,
        entries: HashMap<String, MappingEntry>,
        ciphertexts: HashMap<String, Vec<u8>>,
    ) -> usize {
        let mut restored = 0;
        {
            let mut guard = self.entries.write().unwrap();
            for (identifier, entry) in entries {
                guard.entry(identifier).or_insert_with(|| {
                    restored += 1;
                    entry
                });
            }
        }
        {
            let mut guard = self.ciphertexts.write().unwrap();
            for (identifier, ciphertext) in ciphertexts {
                guard.entry(identifier).or_insert(ciphertext);
            }
        }
        restored
    }

    /// Clear all stored data. Test helper.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
        self.ciphertexts.write().unwrap().clear();
    }
}
