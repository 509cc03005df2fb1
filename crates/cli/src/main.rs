//! Vecsearch CLI
//!
//! Main entry point for the vecsearch command-line tool.
//! Embeds texts as int8 vectors and manages a vector search index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    CountCommand, DeleteCommand, EmbedCommand, IndexCommand, QueryCommand, RunCommand,
    SchemaCommand,
};
use std::path::PathBuf;
use vecsearch_core::{config::AppConfig, logging, AppResult};
use vecsearch_index::Pipeline;

/// Vecsearch - int8 embeddings and vector search
#[derive(Parser, Debug)]
#[command(name = "vecsearch")]
#[command(about = "Index and query int8 text embeddings", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "VECSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Name of the search index
    #[arg(short, long, global = true, env = "VECSEARCH_INDEX")]
    index: Option<String>,

    /// Embedding provider (cohere, mock)
    #[arg(long, global = true, env = "VECSEARCH_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    /// Search backend (azure, memory)
    #[arg(long, global = true, env = "VECSEARCH_SEARCH_BACKEND")]
    search_backend: Option<String>,

    /// Embedding model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the index or update its schema
    Schema(SchemaCommand),

    /// Embed texts and upload them as documents
    Index(IndexCommand),

    /// Query the index for similar documents
    Query(QueryCommand),

    /// Print int8 embeddings for texts
    Embed(EmbedCommand),

    /// Define, index and query in one go
    Run(RunCommand),

    /// Delete the index
    Delete(DeleteCommand),

    /// Count documents in the index
    Count(CountCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Schema(_) => "schema",
            Commands::Index(_) => "index",
            Commands::Query(_) => "query",
            Commands::Embed(_) => "embed",
            Commands::Run(_) => "run",
            Commands::Delete(_) => "delete",
            Commands::Count(_) => "count",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, then config file, then environment, then flags
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.index,
        cli.embedding_provider,
        cli.search_backend,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Vecsearch CLI starting");
    tracing::debug!(
        "Embedding: {} ({}, {} dims)",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.dimensions
    );
    tracing::debug!(
        "Search: {} (index {})",
        config.search.backend,
        config.search.index_name
    );

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Schema(cmd) if cmd.dry_run => cmd.print(&config),
        command => dispatch(command, &config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

/// Build the pipeline and run a command against it.
async fn dispatch(command: Commands, config: &AppConfig) -> AppResult<()> {
    // Missing credentials fail here, before any network call
    config.validate()?;
    let pipeline = Pipeline::from_config(config)?;

    match command {
        Commands::Schema(cmd) => cmd.execute(&pipeline).await,
        Commands::Index(cmd) => cmd.execute(&pipeline).await,
        Commands::Query(cmd) => cmd.execute(&pipeline).await,
        Commands::Embed(cmd) => cmd.execute(&pipeline).await,
        Commands::Run(cmd) => cmd.execute(&pipeline).await,
        Commands::Delete(cmd) => cmd.execute(&pipeline).await,
        Commands::Count(cmd) => cmd.execute(&pipeline).await,
    }
}
