//! Room-based chat relay server.
//!
//! Clients connect over WebSocket at `/ws`, join rooms and exchange
//! messages; the REST surface covers rooms, history and file uploads.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! ```

use clap::Parser;

use chat_relay_rs::{ServerConfig, logger::setup_logger, run_server};

/// Command-line options
#[derive(Debug, Parser)]
#[command(name = "server", about = "Room-based chat relay server")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 5001)]
    port: u16,

    /// Directory where uploaded files are stored
    #[arg(long, default_value = "public/uploads")]
    upload_dir: std::path::PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    // Run the server
    if let Err(e) = run_server(ServerConfig {
        port: args.port,
        upload_dir: args.upload_dir,
    })
    .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
