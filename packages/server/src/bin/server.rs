//! Banter broadcast coordinator.
//!
//! Accepts one WebSocket connection per participant, stamps every event with
//! coordinator-advanced Lamport time and fans it out to everyone else.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin banter-server -- --port 50051
//! ```

use banter_shared::logger::setup_logger;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "banter-server", about = "Banter broadcast coordinator")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 50051)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the coordinator
    if let Err(e) = banter_server::run_server(&args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
