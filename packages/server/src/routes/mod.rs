pub mod decrypt;
pub mod health;
pub mod redact;
pub mod state;

pub use decrypt::decrypt_handler;
pub use health::health_handler;
pub use redact::redact_handler;
pub use state::{export_state_handler, import_state_handler};
