//! Run command handler.
//!
//! Runs every stage in order: define the index, index the documents,
//! then query them.

use super::{print_hits, read_texts};
use clap::Args;
use std::path::PathBuf;
use vecsearch_core::AppResult;
use vecsearch_index::Pipeline;

/// Define the index, upload documents and run one query
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Documents to index
    pub texts: Vec<String>,

    /// Read additional documents from a file, one per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Query text
    #[arg(short, long)]
    pub query: String,

    /// Number of results to return
    #[arg(short = 'k', long, default_value = "3")]
    pub top_k: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing run command");

        let texts = read_texts(&self.texts, self.file.as_deref())?;

        pipeline.define_index().await?;
        let stats = pipeline.index_texts(&texts).await?;
        tracing::info!("Indexed {} documents", stats.documents_count);

        let hits = pipeline.query(&self.query, self.top_k).await?;
        print_hits(&hits, self.json)
    }
}
