//! Encryption backend implementations.

pub mod sealed;

pub use sealed::{SealedBackend, SealedContext};
