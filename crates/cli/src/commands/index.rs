//! Index command handler.
//!
//! Embeds texts as documents and upserts them into the index.

use super::read_texts;
use clap::Args;
use std::path::PathBuf;
use vecsearch_core::{AppError, AppResult};
use vecsearch_index::{IdStrategy, Pipeline};

/// Embed and upload documents
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Texts to index
    pub texts: Vec<String>,

    /// Read additional texts from a file, one per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Document key strategy (content-hash, positional, random)
    #[arg(long, default_value = "content-hash")]
    pub ids: String,

    /// Apply the index schema before uploading
    #[arg(long)]
    pub define: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing index command");

        let strategy = IdStrategy::parse(&self.ids).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown id strategy: '{}'. Supported: content-hash, positional, random",
                self.ids
            ))
        })?;
        let texts = read_texts(&self.texts, self.file.as_deref())?;

        let pipeline = pipeline.clone().with_id_strategy(strategy);
        if self.define {
            pipeline.define_index().await?;
        }

        let stats = pipeline.index_texts(&texts).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Indexed {} documents into '{}' in {:.2}s",
                stats.documents_count,
                pipeline.schema().name,
                stats.duration_secs
            );
        }

        Ok(())
    }
}
