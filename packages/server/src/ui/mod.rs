//! WebSocket game server: routing, per-connection sessions and background tasks.

mod handler;
mod reaper;
mod runner;
pub mod session;
mod signal;
pub mod state;

pub use runner::{build_app, run};
