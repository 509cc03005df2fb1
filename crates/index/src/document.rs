//! Documents stored in the index and identifier assignment.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use vecsearch_core::{AppError, AppResult};

/// A row of the index: key, searchable text and its int8 embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique key
    pub id: String,

    /// Original text
    pub text: String,

    /// int8 embedding of `text`
    pub embedding: Vec<i8>,
}

/// How document keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Position of the text in the input batch. Repeated runs over
    /// different inputs overwrite each other's rows.
    Positional,

    /// SHA-256 of the text. Stable across runs. Repeats of a text within
    /// one batch get a `-<n>` suffix so each input keeps its own row.
    #[default]
    ContentHash,

    /// Fresh UUID v4 per row.
    Random,
}

impl IdStrategy {
    /// Parse strategy from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "positional" | "position" => Some(Self::Positional),
            "content-hash" | "content_hash" | "hash" => Some(Self::ContentHash),
            "random" | "uuid" => Some(Self::Random),
            _ => None,
        }
    }

    /// Key for the text at `position`.
    pub fn assign(&self, position: usize, text: &str) -> String {
        match self {
            Self::Positional => position.to_string(),
            Self::ContentHash => content_hash(text),
            Self::Random => uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Lowercase hex SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Pair texts with their embeddings and assign keys.
///
/// Keys are unique within the batch: the n-th repeat of a key is
/// suffixed with `-<n>`.
///
/// # Errors
/// `AppError::Precondition` when the two sequences differ in length.
pub fn build_documents(
    texts: &[String],
    embeddings: Vec<Vec<i8>>,
    strategy: IdStrategy,
) -> AppResult<Vec<Document>> {
    if texts.len() != embeddings.len() {
        return Err(AppError::Precondition(format!(
            "Got {} texts but {} embeddings",
            texts.len(),
            embeddings.len()
        )));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();

    Ok(texts
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(position, (text, embedding))| {
            let key = strategy.assign(position, text);
            let repeats = seen.entry(key.clone()).or_insert(0);
            let id = if *repeats == 0 {
                key
            } else {
                format!("{}-{}", key, repeats)
            };
            *repeats += 1;

            Document {
                id,
                text: text.clone(),
                embedding,
            }
        })
        .collect())
}

/// Per-row outcome of an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResult {
    /// Document key
    pub key: String,

    /// Whether the row was stored
    pub status: bool,

    #[serde(default)]
    pub error_message: Option<String>,

    pub status_code: u16,
}

impl IndexingResult {
    pub fn succeeded(key: impl Into<String>, status_code: u16) -> Self {
        Self {
            key: key.into(),
            status: true,
            error_message: None,
            status_code,
        }
    }

    pub fn failed(key: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: false,
            error_message: Some(message.into()),
            status_code,
        }
    }
}

/// Fail if any row of an upload was rejected.
pub fn ensure_all_succeeded(results: &[IndexingResult]) -> AppResult<()> {
    let failures: Vec<String> = results
        .iter()
        .filter(|r| !r.status)
        .map(|r| {
            format!(
                "{} ({}: {})",
                r.key,
                r.status_code,
                r.error_message.as_deref().unwrap_or("no message")
            )
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(AppError::Search(format!(
            "{} of {} documents failed to index: {}",
            failures.len(),
            results.len(),
            failures.join(", ")
        )))
    }
}
