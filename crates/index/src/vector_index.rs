//! Vector index abstraction.
//!
//! Defines a trait for backend-agnostic schema management, document
//! upserts and top-k vector queries against a single named index.

use crate::azure_index::AzureSearchIndex;
use crate::document::{Document, IndexingResult};
use crate::memory_index::InMemoryIndex;
use crate::query::{SearchHit, VectorQuery};
use crate::schema::IndexSchema;
use std::sync::Arc;
use vecsearch_core::{AppError, AppResult, SearchSettings};

/// Trait for vector index backends.
///
/// Implementations are bound to one index name and must support:
/// - Creating or updating the index schema (idempotent)
/// - Upserting documents with embeddings
/// - Searching for the top-k most similar vectors
/// - Counting and deleting
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    /// Backend name (e.g., "azure", "memory").
    fn backend_name(&self) -> &str;

    /// Name of the index this client targets.
    fn index_name(&self) -> &str;

    /// Create the index if absent, or update its schema if present.
    async fn create_or_update_index(&self, schema: &IndexSchema) -> AppResult<()>;

    /// Delete the index and all its documents. Deleting a missing index
    /// is not an error.
    async fn delete_index(&self) -> AppResult<()>;

    /// Insert or replace documents by key.
    ///
    /// Returns one result per document. Rows the service rejected have
    /// `status == false`; the call itself only fails when the whole batch
    /// was refused.
    async fn upload_documents(&self, documents: &[Document]) -> AppResult<Vec<IndexingResult>>;

    /// Search for the top-k documents closest to the query vector.
    ///
    /// Returns hits ordered by descending similarity score.
    async fn search(&self, query: &VectorQuery) -> AppResult<Vec<SearchHit>>;

    /// Number of documents in the index.
    async fn document_count(&self) -> AppResult<u64>;
}

/// Create a vector index client for the configured backend.
pub fn create_index(settings: &SearchSettings) -> AppResult<Arc<dyn VectorIndex>> {
    match settings.backend.to_lowercase().as_str() {
        "azure" => Ok(Arc::new(AzureSearchIndex::new(settings)?)),
        "memory" => Ok(Arc::new(InMemoryIndex::new(settings.index_name.clone()))),
        other => Err(AppError::Config(format!(
            "Unknown search backend: '{}'. Supported backends: azure, memory",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_memory_index() {
        let settings = SearchSettings {
            backend: "memory".to_string(),
            index_name: "docs".to_string(),
            ..Default::default()
        };
        let index = create_index(&settings).unwrap();
        assert_eq!(index.backend_name(), "memory");
        assert_eq!(index.index_name(), "docs");
    }

    #[test]
    fn test_azure_requires_credentials() {
        let err = create_index(&SearchSettings::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_unknown_backend() {
        let settings = SearchSettings {
            backend: "lancedb".to_string(),
            ..Default::default()
        };
        match create_index(&settings) {
            Err(err) => assert!(err.to_string().contains("Unknown search backend")),
            Ok(_) => panic!("Expected error for unknown backend"),
        }
    }
}
