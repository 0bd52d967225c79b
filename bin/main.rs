//! Recstore CLI Entry Point
//!
//! This binary provides the command-line interface for the record store.

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = recstore_interface::run_cli().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
