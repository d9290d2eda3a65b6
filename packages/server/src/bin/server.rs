//! WebSocket message relay server.
//!
//! Relays every message a client sends to all connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --port 3000 --payload document
//! PORT=9000 cargo run --bin hiroba-server
//! ```

use clap::Parser;
use hiroba_server::{Args, ServerConfig, bootstrap};
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());
    tracing::info!(
        "Starting relay (payload: {}, queue capacity: {}, write timeout: {:?})",
        config.payload_mode,
        config
            .dispatcher
            .queue_capacity
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
        config.dispatcher.write_timeout
    );

    let (server, dispatcher) = bootstrap(&config);
    tokio::spawn(dispatcher.run());

    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
