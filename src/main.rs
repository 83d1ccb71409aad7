//! vagas-plus CLI entry point
//!
//! Accessible parking spot finder - CLI + web API

use vagas_plus::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
