//! Core trait abstractions (Detector, EncryptionBackend).

pub mod backend;
pub mod detector;

pub use backend::EncryptionBackend;
pub use detector::Detector;
