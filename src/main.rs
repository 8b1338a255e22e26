mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use muisti::config::{Config, StoreBackend};
use muisti::errors::Error;
use muisti::store::{AzureSearchStore, InMemoryStore, SqliteStore, VectorStore};

use commands::Commands;
use output::{print_json, ErrorResponse};

/// muisti - A semantic memory layer for AI applications
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Collection to operate on (default from config)
    #[arg(short = 'c', long)]
    collection: Option<String>,

    /// Storage backend: sqlite, memory, or azure-search (default from config)
    #[arg(long)]
    store: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("muisti=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("muisti=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> Result<Box<dyn VectorStore>, Error> {
    match config.store {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(
            &config.database_path,
            config.embedding_dims,
        )?)),
        StoreBackend::Memory => Ok(Box::new(InMemoryStore::new(config.embedding_dims))),
        StoreBackend::AzureSearch => Ok(Box::new(AzureSearchStore::from_config(config)?)),
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    if matches!(cli.command, Commands::Version) {
        return commands::version(cli.json);
    }

    let mut config = Config::load()?;
    if let Some(store) = &cli.store {
        config.store = store.parse()?;
        config.validate()?;
    }
    config.ensure_directories()?;

    let collection = cli
        .collection
        .clone()
        .unwrap_or_else(|| config.default_collection.clone());
    debug!(
        store = config.store.as_str(),
        collection, "muisti initialized"
    );

    // Provider clients are built inside the handlers that call out, so
    // local store commands work without an API key.
    let store = open_store(&config)?;
    commands::execute(&cli.command, store, &collection, &config, cli.json)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["muisti", "--json", "-c", "notes", "version"]);
        assert!(cli.json);
        assert_eq!(cli.collection.as_deref(), Some("notes"));
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["muisti", "list"]);
        assert!(!cli.json);
        assert!(!cli.verbose);
        assert!(cli.collection.is_none());
        assert!(cli.store.is_none());
    }

    #[test]
    fn test_cli_save_args() {
        let cli = Cli::parse_from([
            "muisti",
            "save",
            "water boils at 100C",
            "--id",
            "fact-1",
            "-m",
            "{\"kind\":\"fact\"}",
        ]);
        match cli.command {
            Commands::Save { text, id, metadata } => {
                assert_eq!(text, "water boils at 100C");
                assert_eq!(id.as_deref(), Some("fact-1"));
                assert_eq!(metadata.as_deref(), Some("{\"kind\":\"fact\"}"));
            }
            _ => panic!("Expected Commands::Save"),
        }
    }

    #[test]
    fn test_cli_search_defaults() {
        let cli = Cli::parse_from(["muisti", "search", "boiling point"]);
        match cli.command {
            Commands::Search {
                query,
                limit,
                min_relevance,
            } => {
                assert_eq!(query, "boiling point");
                assert_eq!(limit, 5);
                assert!(min_relevance.is_none());
            }
            _ => panic!("Expected Commands::Search"),
        }
    }
}
