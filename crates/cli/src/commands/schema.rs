//! Schema command handler.
//!
//! Creates the index or updates its schema.

use clap::Args;
use vecsearch_core::{AppConfig, AppResult};
use vecsearch_index::{IndexSchema, Pipeline};

/// Create or update the index schema
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Print the schema JSON without applying it
    #[arg(long)]
    pub dry_run: bool,
}

impl SchemaCommand {
    /// Print the configured schema. Needs no credentials.
    pub fn print(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing schema command (dry run)");

        let schema = IndexSchema::from_config(config)?;
        schema.validate()?;
        println!("{}", serde_json::to_string_pretty(&schema)?);

        Ok(())
    }

    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing schema command");

        pipeline.define_index().await?;
        println!("Index '{}' is up to date", pipeline.schema().name);

        Ok(())
    }
}
