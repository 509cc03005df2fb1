//! End-to-end embedding and search pipeline.
//!
//! Composes an embedding client and a vector index: declare the schema,
//! embed and upsert documents, embed a query and run a top-k search.
//! Every stage awaits its single remote call before the next starts.

use crate::document::{build_documents, ensure_all_succeeded, IdStrategy};
use crate::query::{SearchHit, VectorQuery};
use crate::schema::{IndexSchema, EMBEDDING_FIELD};
use crate::vector_index::{create_index, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use vecsearch_core::{AppConfig, AppError, AppResult};
use vecsearch_embed::{create_client, EmbeddingClient, InputType};

/// Statistics from an indexing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents upserted
    pub documents_count: usize,

    /// Keys assigned to the documents, in input order
    pub ids: Vec<String>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Embedding client, vector index and schema wired together.
#[derive(Debug, Clone)]
pub struct Pipeline {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    schema: IndexSchema,
    id_strategy: IdStrategy,
}

impl Pipeline {
    /// Wire an embedder and an index around `schema`.
    ///
    /// # Errors
    /// `AppError::Precondition` when the schema targets another index or
    /// its vector field does not match the embedder's dimensionality.
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        schema: IndexSchema,
    ) -> AppResult<Self> {
        if schema.name != index.index_name() {
            return Err(AppError::Precondition(format!(
                "Schema is for index '{}' but client targets '{}'",
                schema.name,
                index.index_name()
            )));
        }

        let dims = schema.vector_dimensions(EMBEDDING_FIELD).ok_or_else(|| {
            AppError::Precondition(format!(
                "Schema has no vector field named '{}'",
                EMBEDDING_FIELD
            ))
        })?;

        if dims != embedder.dimensions() {
            return Err(AppError::Precondition(format!(
                "Embedding model '{}' produces {} dimensions but field '{}' declares {}",
                embedder.model_name(),
                embedder.dimensions(),
                EMBEDDING_FIELD,
                dims
            )));
        }

        Ok(Self {
            embedder,
            index,
            schema,
            id_strategy: IdStrategy::default(),
        })
    }

    /// Build the pipeline described by the application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_client(&config.embedding)?;
        let index = create_index(&config.search)?;
        let schema = IndexSchema::from_config(config)?;

        Self::new(embedder, index, schema)
    }

    /// Use a different key assignment strategy.
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn embedder(&self) -> &dyn EmbeddingClient {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Create or update the index schema.
    pub async fn define_index(&self) -> AppResult<()> {
        tracing::info!(
            "Applying schema for index '{}' on backend '{}'",
            self.schema.name,
            self.index.backend_name()
        );
        self.index.create_or_update_index(&self.schema).await
    }

    /// Embed texts in the given mode.
    pub async fn embed(&self, texts: &[String], input_type: InputType) -> AppResult<Vec<Vec<i8>>> {
        tracing::info!(
            "Embedding {} texts as {} using provider '{}' (model: {})",
            texts.len(),
            input_type.as_str(),
            self.embedder.provider_name(),
            self.embedder.model_name()
        );
        self.embedder.embed_texts(texts, input_type).await
    }

    /// Upsert texts with precomputed embeddings.
    ///
    /// # Errors
    /// Precondition errors for mismatched lengths or dimensions are raised
    /// before the upload. Any row the service rejects fails the whole call.
    pub async fn index_documents(
        &self,
        texts: &[String],
        embeddings: Vec<Vec<i8>>,
    ) -> AppResult<IndexStats> {
        let start = Instant::now();

        let dims = self.embedder.dimensions();
        if let Some(position) = embeddings.iter().position(|e| e.len() != dims) {
            return Err(AppError::Precondition(format!(
                "Embedding at position {} has {} dimensions, index expects {}",
                position,
                embeddings[position].len(),
                dims
            )));
        }

        let documents = build_documents(texts, embeddings, self.id_strategy)?;
        let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();

        if !documents.is_empty() {
            let results = self.index.upload_documents(&documents).await?;
            ensure_all_succeeded(&results)?;
        }

        let duration = start.elapsed();
        tracing::info!(
            "Indexed {} documents into '{}' in {:.2}s",
            documents.len(),
            self.schema.name,
            duration.as_secs_f64()
        );

        Ok(IndexStats {
            documents_count: documents.len(),
            ids,
            duration_secs: duration.as_secs_f64(),
        })
    }

    /// Embed texts as documents and upsert them.
    pub async fn index_texts(&self, texts: &[String]) -> AppResult<IndexStats> {
        let embeddings = self.embed(texts, InputType::SearchDocument).await?;
        self.index_documents(texts, embeddings).await
    }

    /// Return the `k` documents most similar to `query`, best first.
    pub async fn query(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if k == 0 {
            return Err(AppError::Precondition("k must be at least 1".to_string()));
        }

        tracing::info!("Querying index '{}' for top {}", self.schema.name, k);

        let vector = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&VectorQuery::new(vector, k)).await?;

        tracing::debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score).unwrap_or_default(),
            "Query complete"
        );

        Ok(hits)
    }

    /// Drop the index.
    pub async fn delete_index(&self) -> AppResult<()> {
        tracing::info!("Deleting index '{}'", self.schema.name);
        self.index.delete_index().await
    }

    /// Number of documents in the index.
    pub async fn document_count(&self) -> AppResult<u64> {
        self.index.document_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_index::InMemoryIndex;
    use crate::schema::HnswParameters;
    use vecsearch_core::HnswSettings;
    use vecsearch_embed::MockClient;

    fn pipeline(dims: usize) -> Pipeline {
        let hnsw = HnswParameters::from_settings(&HnswSettings::default()).unwrap();
        Pipeline::new(
            Arc::new(MockClient::new("trigram-v1", dims)),
            Arc::new(InMemoryIndex::new("docs")),
            IndexSchema::int8_documents("docs", dims, hnsw),
        )
        .unwrap()
    }

    #[test]
    fn test_dimension_mismatch_rejected_at_construction() {
        let hnsw = HnswParameters::from_settings(&HnswSettings::default()).unwrap();
        let err = Pipeline::new(
            Arc::new(MockClient::new("trigram-v1", 256)),
            Arc::new(InMemoryIndex::new("docs")),
            IndexSchema::int8_documents("docs", 1024, hnsw),
        )
        .unwrap_err();
        assert!(err.to_string().contains("256 dimensions"));
    }

    #[test]
    fn test_schema_index_name_mismatch() {
        let hnsw = HnswParameters::from_settings(&HnswSettings::default()).unwrap();
        let err = Pipeline::new(
            Arc::new(MockClient::new("trigram-v1", 8)),
            Arc::new(InMemoryIndex::new("docs")),
            IndexSchema::int8_documents("other", 8, hnsw),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_count_mismatch_fails_before_upload() {
        let pipeline = pipeline(16);
        pipeline.define_index().await.unwrap();

        let texts = vec!["one".to_string(), "two".to_string()];
        let err = pipeline
            .index_documents(&texts, vec![vec![0; 16]])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Precondition(_)));
        assert_eq!(pipeline.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_embedding_length_fails_before_upload() {
        let pipeline = pipeline(16);
        pipeline.define_index().await.unwrap();

        let err = pipeline
            .index_documents(&["one".to_string()], vec![vec![0; 8]])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[tokio::test]
    async fn test_positional_ids_collide_on_rerun() {
        let pipeline = pipeline(64).with_id_strategy(IdStrategy::Positional);
        pipeline.define_index().await.unwrap();

        let first = pipeline.index_texts(&["first run".to_string()]).await.unwrap();
        let second = pipeline.index_texts(&["second run".to_string()]).await.unwrap();

        assert_eq!(first.ids, vec!["0"]);
        assert_eq!(second.ids, vec!["0"]);
        assert_eq!(pipeline.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_content_hash_ids_survive_rerun() {
        let pipeline = pipeline(64);
        pipeline.define_index().await.unwrap();

        pipeline.index_texts(&["first run".to_string()]).await.unwrap();
        pipeline.index_texts(&["second run".to_string()]).await.unwrap();
        pipeline.index_texts(&["first run".to_string()]).await.unwrap();

        assert_eq!(pipeline.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_query_k_zero() {
        let pipeline = pipeline(16);
        pipeline.define_index().await.unwrap();
        assert!(pipeline.query("anything", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_from_config_offline() {
        let mut config = AppConfig::default();
        config.embedding.provider = "mock".to_string();
        config.embedding.dimensions = 32;
        config.search.backend = "memory".to_string();

        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.schema().name, config.search.index_name);
        assert_eq!(pipeline.embedder().provider_name(), "mock");
        assert_eq!(pipeline.index().backend_name(), "memory");
    }
}
