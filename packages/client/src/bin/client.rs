//! Terminal chat client.
//!
//! Resolves the user from the access token, loads the conversations over REST
//! and keeps them up to date from the backend's server-sent event stream.
//! The event stream reconnects automatically (max 5 attempts with 5 second
//! interval by default).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin wac-client -- --api-url http://localhost:8080/api --access-token <token>
//! WAC_ACCESS_TOKEN=<token> cargo run --bin wac-client
//! ```

use clap::Parser;

use wac_client::config::{ClientArgs, ClientConfig};
use wac_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = ClientArgs::parse();
    let config = match ClientConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = wac_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
