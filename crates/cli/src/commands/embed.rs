//! Embed command handler.
//!
//! Prints raw int8 embeddings without touching the index.

use super::read_texts;
use clap::Args;
use std::path::PathBuf;
use vecsearch_core::{AppError, AppResult};
use vecsearch_embed::InputType;
use vecsearch_index::Pipeline;

/// Number of leading components shown in text output.
const PREVIEW_LEN: usize = 8;

/// Generate embeddings for texts
#[derive(Args, Debug)]
pub struct EmbedCommand {
    /// Texts to embed
    pub texts: Vec<String>,

    /// Read additional texts from a file, one per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Embedding mode (document, query)
    #[arg(long, default_value = "document")]
    pub input_type: String,

    /// Output full vectors as JSON
    #[arg(long)]
    pub json: bool,
}

impl EmbedCommand {
    pub async fn execute(&self, pipeline: &Pipeline) -> AppResult<()> {
        tracing::info!("Executing embed command");

        let input_type = InputType::parse(&self.input_type).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown input type: '{}'. Supported: document, query",
                self.input_type
            ))
        })?;
        let texts = read_texts(&self.texts, self.file.as_deref())?;

        let embeddings = pipeline.embed(&texts, input_type).await?;

        if self.json {
            let output: Vec<serde_json::Value> = texts
                .iter()
                .zip(&embeddings)
                .map(|(text, embedding)| serde_json::json!({ "text": text, "embedding": embedding }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (text, embedding) in texts.iter().zip(&embeddings) {
                let preview: Vec<String> = embedding
                    .iter()
                    .take(PREVIEW_LEN)
                    .map(|v| v.to_string())
                    .collect();
                println!(
                    "{} [{} dims]: [{}, ...]",
                    text,
                    embedding.len(),
                    preview.join(", ")
                );
            }
        }

        Ok(())
    }
}
