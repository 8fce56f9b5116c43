//! Shelf-life server - look up how long perishable products keep
//!
//! An HTTP service that answers "when does this product expire in my time
//! zone" and "which products match this name" for the mobile client.

use std::process::ExitCode;

use clap::Parser;

use shelflife::cli::{Cli, ServerConfig};
use shelflife::server;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    server::init_logging();

    if let Err(e) = server::run(config).await {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
