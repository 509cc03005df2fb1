//! Index maintenance commands.

use clap::Args;
use vecsearch_core::{AppError, AppResult};
use vecsearch_index::Pipeline;

/// Delete the index and all its documents
#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Confirm deletion
    #[arg(short, long)]
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing delete command");

        if !self.yes {
            return Err(AppError::Precondition(format!(
                "Refusing to delete index '{}' without --yes",
                pipeline.schema().name
            )));
        }

        pipeline.delete_index().await?;
        println!("Index '{}' deleted", pipeline.schema().name);

        Ok(())
    }
}

/// Show the number of documents in the index
#[derive(Args, Debug)]
pub struct CountCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CountCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing count command");

        let count = pipeline.document_count().await?;

        if self.json {
            let output = serde_json::json!({
                "index": pipeline.schema().name,
                "documentsCount": count,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Index: {}", pipeline.schema().name);
            println!("  Documents: {}", count);
        }

        Ok(())
    }
}
