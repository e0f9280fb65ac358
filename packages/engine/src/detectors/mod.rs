//! Detector implementations.

pub mod llm;

pub use llm::LlmDetector;
