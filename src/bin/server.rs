//! Coordination server for the dealership assistance platform.
//!
//! Serves the shopper/representative WebSocket endpoints, the collaboration
//! document rooms, and the REST surface (inventory, chat assistant).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! ```

use dealer_assist_rs::common::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the server
    if let Err(e) = dealer_assist_rs::run_server().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
