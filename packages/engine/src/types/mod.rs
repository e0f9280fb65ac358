//! Data types for the redaction pipeline.

pub mod config;
pub mod entity;

pub use config::{EngineConfig, SealParams};
pub use entity::{
    encryption_id, CandidateEntity, Entity, EncryptionRecord, MappingEntry, RedactedEntity,
    RedactionResult,
};
