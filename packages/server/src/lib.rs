//! HTTP surface for the redaction engine.
//!
//! A thin Axum layer: routes deserialize requests, call the engine,
//! and render typed errors as status codes. All redaction semantics
//! live in the `pii-engine` crate.

pub mod app;
pub mod config;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::Config;
