//! Core Service Layer
//!
//! Shared infrastructure for the chat server: configuration, data models,
//! validation, storage, time and process lifecycle.

pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod lifecycle;
pub mod models;
pub mod router;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use config::{AppState, ChatServerConfig};
pub use error::{Error, Result};
pub use lifecycle::Lifecycle;
pub use router::router;
