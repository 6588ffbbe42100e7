//! Shared utilities for the Guessroom workspace.

pub mod logger;
pub mod time;
