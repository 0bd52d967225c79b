//! Recstore Interface - request layer
//!
//! - config: YAML + environment configuration
//! - cli: command line front end over a shared repository

pub mod cli;
pub mod config;

#[cfg(test)]
mod cli_tests;

pub use cli::{run as run_cli, CliError};
pub use config::{ConfigError, RecstoreConfig};
