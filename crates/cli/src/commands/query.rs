//! Query command handler.

use super::print_hits;
use clap::Args;
use vecsearch_core::AppResult;
use vecsearch_index::Pipeline;

/// Find the documents most similar to a query
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Query text
    pub query: String,

    /// Number of results to return
    #[arg(short = 'k', long, default_value = "3")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing query command");

        let hits = pipeline.query(&self.query, self.top_k).await?;
        print_hits(&hits, self.json)
    }
}
