//! Banter participant client.
//!
//! Joins the coordinator, sends each typed line as a chat message and prints
//! every broadcast together with the resulting local Lamport clock value.
//! Type `exit` to leave gracefully.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin banter-client -- --participant-id 1
//! ```

use banter_shared::logger::setup_logger;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "banter-client", about = "Banter chat participant")]
struct Args {
    /// Identifier for this participant, unique among connected participants.
    /// 0 is reserved for coordinator-synthesized events.
    #[arg(long)]
    participant_id: u64,

    /// Coordinator host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Coordinator port
    #[arg(long, default_value_t = 50051)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    if args.participant_id == 0 {
        tracing::error!("participant id 0 is reserved for the coordinator");
        std::process::exit(1);
    }

    if let Err(e) = banter_client::run_client(args.participant_id, &args.host, args.port).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
