//! Command handlers for the muisti CLI.

use std::process::ExitCode;

use muisti::chat::{ChatClient, ChatCompleter};
use muisti::config::Config;
use muisti::embedding::HttpEmbeddingClient;
use muisti::errors::Error;
use muisti::memory::SemanticMemory;
use muisti::store::{Record, VectorStore};

use crate::output::*;

/// Commands supported by the muisti CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Save a text into the collection
    Save {
        /// Text content to remember
        text: String,

        /// Stable identifier; replaces an existing record with the same id
        #[arg(long)]
        id: Option<String>,

        /// Optional JSON metadata
        #[arg(short = 'm', long)]
        metadata: Option<String>,
    },
    /// Recall records by semantic similarity
    Search {
        /// Search query text
        query: String,

        /// Maximum number of results (default: 5)
        #[arg(short = 'l', long, default_value = "5")]
        limit: usize,

        /// Relevance floor (0.0 to 1.0); overrides the configured value
        #[arg(long)]
        min_relevance: Option<f64>,
    },
    /// Retrieve a record by id
    Get {
        /// Record id
        id: String,
    },
    /// List records, newest first
    List {
        /// Maximum number of results (default: 10)
        #[arg(short = 'l', long, default_value = "10")]
        limit: usize,
    },
    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },
    /// Manage collections
    #[command(subcommand)]
    Collection(CollectionCommands),
    /// Answer a question grounded in recalled records
    Ask {
        /// Question to answer
        question: String,

        /// Maximum number of records to ground on (default: 5)
        #[arg(short = 'l', long, default_value = "5")]
        limit: usize,
    },
    Version,
}

/// Collection management subcommands.
#[derive(clap::Subcommand)]
pub enum CollectionCommands {
    /// Create the collection if it does not exist
    Ensure,
    /// Delete the collection and everything in it
    Drop,
    /// Check whether the collection exists
    Exists,
}

fn result_item(record: Record) -> SearchResultItem {
    SearchResultItem {
        id: record.id,
        text: record.text,
        relevance: record.relevance.unwrap_or(0.0),
        created_at: record.created_at,
    }
}

/// Wire the store up to the configured embedding provider.
///
/// Only called for commands that embed text, so purely local operations
/// never demand an API key.
fn connect(store: Box<dyn VectorStore>, config: &Config) -> Result<SemanticMemory, Error> {
    let embedder = HttpEmbeddingClient::from_config(config)?;
    Ok(SemanticMemory::new(store, Box::new(embedder)))
}

/// Execute a CLI command against the given collection.
pub fn execute(
    command: &Commands,
    mut store: Box<dyn VectorStore>,
    collection: &str,
    config: &Config,
    json: bool,
) -> Result<ExitCode, Error> {
    match command {
        Commands::Save { text, id, metadata } => {
            let mut memory = connect(store, config)?;
            handle_save(&mut memory, collection, id.as_deref(), text, metadata.as_deref(), json)
        }
        Commands::Search {
            query,
            limit,
            min_relevance,
        } => {
            let memory = connect(store, config)?;
            handle_search(
                &memory,
                collection,
                query,
                *limit,
                min_relevance.unwrap_or(config.min_relevance),
                json,
            )
        }
        Commands::Get { id } => handle_get(store.as_ref(), collection, id, json),
        Commands::List { limit } => handle_list(store.as_ref(), collection, *limit, json),
        Commands::Delete { id } => handle_delete(store.as_mut(), collection, id, json),
        Commands::Collection(subcommand) => {
            handle_collection(store.as_mut(), collection, subcommand, json)
        }
        Commands::Ask { question, limit } => {
            let memory = connect(store, config)?;
            let chat = ChatClient::from_config(config)?;
            handle_ask(
                &memory,
                &chat,
                collection,
                question,
                *limit,
                config.min_relevance,
                json,
            )
        }
        Commands::Version => version(json),
    }
}

fn handle_save(
    memory: &mut SemanticMemory,
    collection: &str,
    id: Option<&str>,
    text: &str,
    metadata: Option<&str>,
    json: bool,
) -> Result<ExitCode, Error> {
    let id = memory.save(collection, id, text, metadata)?;
    if json {
        print_json(&SaveResponse {
            status: "saved".to_string(),
            id,
        });
    } else {
        println!("Saved memory: {}", id);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search(
    memory: &SemanticMemory,
    collection: &str,
    query: &str,
    limit: usize,
    min_relevance: f64,
    json: bool,
) -> Result<ExitCode, Error> {
    let records = memory.recall(collection, query, limit, min_relevance)?;
    if json {
        let results: Vec<SearchResultItem> = records.into_iter().map(result_item).collect();
        print_json(&SearchResponse { results });
    } else {
        for record in records {
            let score = record.relevance.unwrap_or(0.0);
            println!("{} [score: {:.2}]\n  {}\n", record.id, score, record.text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_get(
    store: &dyn VectorStore,
    collection: &str,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let record = store
        .get(collection, id)?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    if json {
        print_json(&GetResponse {
            id: record.id.clone(),
            text: record.text.clone(),
            collection: record.collection,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        });
    } else {
        println!("ID: {}", record.id);
        println!("Text: {}", record.text);
        println!("Collection: {}", record.collection);
        if let Some(meta) = &record.metadata {
            println!("Metadata: {}", meta);
        }
        println!("Created: {}", record.created_at);
        println!("Updated: {}", record.updated_at);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list(
    store: &dyn VectorStore,
    collection: &str,
    limit: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let records = store.list(collection, limit)?;
    if json {
        let items: Vec<ListItem> = records
            .into_iter()
            .map(|r| ListItem {
                id: r.id,
                text: r.text,
                created_at: r.created_at,
            })
            .collect();
        print_json(&ListResponse { records: items });
    } else {
        for record in records {
            println!("{}: {}", record.id, record.text);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_delete(
    store: &mut dyn VectorStore,
    collection: &str,
    id: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let deleted = store.delete(collection, id)?;
    if deleted {
        if json {
            print_json(&DeleteResponse {
                status: "deleted".to_string(),
                id: id.to_string(),
            });
        } else {
            println!("Deleted memory: {}", id);
        }
        Ok(ExitCode::SUCCESS)
    } else {
        Err(Error::NotFound(id.to_string()))
    }
}

fn handle_collection(
    store: &mut dyn VectorStore,
    collection: &str,
    subcommand: &CollectionCommands,
    json: bool,
) -> Result<ExitCode, Error> {
    match subcommand {
        CollectionCommands::Ensure => {
            store.ensure_collection(collection)?;
            if json {
                print_json(&CollectionResponse {
                    status: "ensured".to_string(),
                    collection: collection.to_string(),
                });
            } else {
                println!("Collection ready: {}", collection);
            }
        }
        CollectionCommands::Drop => {
            store.drop_collection(collection)?;
            if json {
                print_json(&CollectionResponse {
                    status: "dropped".to_string(),
                    collection: collection.to_string(),
                });
            } else {
                println!("Collection dropped: {}", collection);
            }
        }
        CollectionCommands::Exists => {
            let exists = store.collection_exists(collection)?;
            if json {
                print_json(&ExistsResponse {
                    collection: collection.to_string(),
                    exists,
                });
            } else {
                println!("{}", exists);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_ask(
    memory: &SemanticMemory,
    chat: &dyn ChatCompleter,
    collection: &str,
    question: &str,
    limit: usize,
    min_relevance: f64,
    json: bool,
) -> Result<ExitCode, Error> {
    let answer = memory.ask(collection, question, limit, min_relevance, chat)?;
    if json {
        let sources: Vec<SearchResultItem> =
            answer.context.into_iter().map(result_item).collect();
        print_json(&AskResponse {
            answer: answer.reply,
            sources,
        });
    } else {
        println!("{}", answer.reply);
        if !answer.context.is_empty() {
            println!();
            for record in answer.context {
                println!(
                    "  [{:.2}] {}",
                    record.relevance.unwrap_or(0.0),
                    record.text
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print version information without touching configuration or providers.
pub fn version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
