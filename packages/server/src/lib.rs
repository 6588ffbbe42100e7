//! Two-player guess-the-number server.
//!
//! A host creates a room and picks a secret number, a joiner enters the room
//! by its id and guesses until correct. This library provides the room
//! registry, the per-connection protocol state machine, rate limiting and
//! the background reaper, wired to an Axum WebSocket endpoint.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::{build_app, run};
