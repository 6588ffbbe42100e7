//! Guess-the-number WebSocket server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin guessroom-server -- --port 8000
//! ```

use clap::Parser;
use guessroom_server::ServerConfig;
use guessroom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::parse();

    // Run the server
    if let Err(e) = guessroom_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
