//! Command handlers for the vecsearch CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod embed;
pub mod index;
pub mod manage;
pub mod query;
pub mod run;
pub mod schema;

// Re-export command types for convenience
pub use embed::EmbedCommand;
pub use index::IndexCommand;
pub use manage::{CountCommand, DeleteCommand};
pub use query::QueryCommand;
pub use run::RunCommand;
pub use schema::SchemaCommand;

use std::path::Path;
use vecsearch_core::{AppError, AppResult};
use vecsearch_index::SearchHit;

/// Collect input texts from arguments and an optional file (one text per line).
pub fn read_texts(texts: &[String], file: Option<&Path>) -> AppResult<Vec<String>> {
    let mut all: Vec<String> = texts.to_vec();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)?;
        all.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        tracing::debug!("Read texts from {:?}", path);
    }

    if all.is_empty() {
        return Err(AppError::Precondition(
            "No input texts given. Pass them as arguments or with --file".to_string(),
        ));
    }

    Ok(all)
}

/// Print ranked hits as a table or JSON.
pub fn print_hits(hits: &[SearchHit], json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!("{}. [{:.4}] {}", rank + 1, hit.score, hit.text);
    }
    Ok(())
}
