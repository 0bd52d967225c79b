//! CLI - Command Line Interface
//!
//! Thin request layer over the record store. The repository is opened once
//! per invocation and handed to the command handlers.
//!
//! Available Commands:
//! - recstore list                     - Print every record
//! - recstore get <ID>                 - Print one record (or null)
//! - recstore find -w key=value ...    - First record matching all filters
//! - recstore create '<JSON>'          - Store a new record
//! - recstore update <ID> '<JSON>'     - Merge fields into a record
//! - recstore delete <ID>              - Remove a record

use clap::{Args, Parser, Subcommand};
use recstore_persistence::{open_repository, Record, SharedRepository, StorageError};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, RecstoreConfig};

/// CLI Errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to render output: {0}")]
    Output(#[source] serde_json::Error),
}

/// Recstore CLI
#[derive(Parser, Debug)]
#[command(name = "recstore")]
#[command(author, version, about = "File-backed JSON record store", long_about = None)]
pub(crate) struct Cli {
    /// Record file path
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write through a temporary file and rename it into place
    #[arg(long, global = true)]
    pub atomic: bool,

    /// Verbose output (logs go to stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Print every record
    List,

    /// Print the record with the given id
    Get(IdArgs),

    /// Print the first record matching every filter
    Find(FindArgs),

    /// Create a record from a JSON object
    Create(CreateArgs),

    /// Merge a JSON object into an existing record
    Update(UpdateArgs),

    /// Delete a record by id
    Delete(IdArgs),
}

#[derive(Args, Debug, PartialEq)]
pub(crate) struct IdArgs {
    /// Record id
    pub id: String,
}

#[derive(Args, Debug, PartialEq)]
pub(crate) struct FindArgs {
    /// Filter as key=value; the value is read as JSON, falling back to a string
    #[arg(short = 'w', long = "where", required = true)]
    pub filters: Vec<String>,
}

#[derive(Args, Debug, PartialEq)]
pub(crate) struct CreateArgs {
    /// Record attributes as a JSON object
    pub attrs: String,
}

#[derive(Args, Debug, PartialEq)]
pub(crate) struct UpdateArgs {
    /// Record id
    pub id: String,

    /// Attributes to merge, as a JSON object
    pub attrs: String,
}

/// Parse CLI arguments and execute the command
pub async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing();
    }

    let config = resolve_config(&cli)?;
    info!(path = %config.storage.path.display(), "Opening record store");
    let repo = open_repository(&config.storage).await?;

    let output = execute(&cli.command, &repo).await?;
    println!("{output}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge config file, environment and flags
pub(crate) fn resolve_config(cli: &Cli) -> Result<RecstoreConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => RecstoreConfig::from_file(path)?,
        None => RecstoreConfig::default(),
    };
    config.apply_env();

    if let Some(store) = &cli.store {
        config.storage.path = store.clone();
    }
    if cli.atomic {
        config.storage.atomic_writes = true;
    }

    Ok(config)
}

/// Run one command against the repository and render its output
pub(crate) async fn execute(command: &Commands, repo: &SharedRepository) -> Result<String, CliError> {
    let value = match command {
        Commands::List => Value::Array(repo.get_all().await?.into_iter().map(Value::Object).collect()),
        Commands::Get(args) => option_value(repo.get_one(&args.id).await?),
        Commands::Find(args) => {
            let filters = parse_filters(&args.filters)?;
            option_value(repo.get_one_by(&filters).await?)
        }
        Commands::Create(args) => Value::Object(repo.create(parse_object(&args.attrs)?).await?),
        Commands::Update(args) => {
            let attrs = parse_object(&args.attrs)?;
            Value::Object(repo.update(&args.id, attrs).await?)
        }
        Commands::Delete(args) => {
            let deleted = repo.delete(&args.id).await?;
            json!({ "id": args.id, "deleted": deleted })
        }
    };

    serde_json::to_string_pretty(&value).map_err(CliError::Output)
}

fn option_value(record: Option<Record>) -> Value {
    record.map(Value::Object).unwrap_or(Value::Null)
}

/// Parse a JSON object argument
pub(crate) fn parse_object(raw: &str) -> Result<Record, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::InvalidInput(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(CliError::InvalidInput(format!("malformed JSON: {e}"))),
    }
}

/// Parse `key=value` filters into a record-shaped map
pub(crate) fn parse_filters(raw: &[String]) -> Result<Record, CliError> {
    let mut filters = Record::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| CliError::InvalidInput(format!("filter '{entry}' is not key=value")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::InvalidInput(format!("filter '{entry}' has an empty key")));
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        filters.insert(key.to_string(), value);
    }
    Ok(filters)
}
