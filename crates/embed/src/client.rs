//! Embedding client abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to an embedding
//! service. Providers implement [`EmbeddingClient::embed`]; callers usually
//! go through [`EmbeddingClient::embed_texts`], which also checks that the
//! service kept its side of the contract.

use crate::types::{EmbeddingType, InputType, Truncate};
use serde::{Deserialize, Serialize};
use vecsearch_core::{AppError, AppResult};

/// Embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Texts to embed, in order
    pub texts: Vec<String>,

    /// Model identifier (e.g., "embed-english-v3.0")
    pub model: String,

    /// Document or query mode
    pub input_type: InputType,

    /// Requested numeric encodings
    pub embedding_types: Vec<EmbeddingType>,

    /// Truncation policy for over-long inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate: Option<Truncate>,
}

impl EmbedRequest {
    /// Create an int8 embedding request.
    pub fn new(texts: Vec<String>, model: impl Into<String>, input_type: InputType) -> Self {
        Self {
            texts,
            model: model.into(),
            input_type,
            embedding_types: vec![EmbeddingType::Int8],
            truncate: None,
        }
    }

    /// Set the truncation policy.
    pub fn with_truncate(mut self, truncate: Truncate) -> Self {
        self.truncate = Some(truncate);
        self
    }
}

/// Embedding response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// Service-side request id, when provided
    pub id: Option<String>,

    /// One int8 vector per input text, same order
    pub embeddings: Vec<Vec<i8>>,

    /// Usage statistics
    #[serde(default)]
    pub usage: EmbedUsage,
}

/// Billing statistics reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EmbedUsage {
    /// Tokens billed for the inputs
    #[serde(default)]
    pub input_tokens: u32,
}

/// Trait for embedding providers.
///
/// Abstracts the underlying service (Cohere, an offline mock, ...) behind a
/// unified interface.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync + std::fmt::Debug {
    /// Get the provider name (e.g., "cohere", "mock").
    fn provider_name(&self) -> &str;

    /// Get the model identifier.
    fn model_name(&self) -> &str;

    /// Dimensionality of every vector this client returns.
    fn dimensions(&self) -> usize;

    /// Send one embedding request.
    ///
    /// # Errors
    /// Service failures are returned as [`AppError::Service`] with the
    /// remote status and message; transport failures as [`AppError::Embedding`].
    async fn embed(&self, request: &EmbedRequest) -> AppResult<EmbedResponse>;

    /// Embed `texts` in the given mode and return one int8 vector per text.
    ///
    /// An empty input returns an empty result without calling the service.
    async fn embed_texts(&self, texts: &[String], input_type: InputType) -> AppResult<Vec<Vec<i8>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest::new(texts.to_vec(), self.model_name(), input_type);
        let response = self.embed(&request).await?;

        check_embeddings(texts.len(), self.dimensions(), &response.embeddings)?;

        tracing::debug!(
            count = response.embeddings.len(),
            dimensions = self.dimensions(),
            input_tokens = response.usage.input_tokens,
            "Generated embeddings"
        );

        Ok(response.embeddings)
    }

    /// Embed a single search query.
    async fn embed_query(&self, query: &str) -> AppResult<Vec<i8>> {
        let mut results = self
            .embed_texts(&[query.to_string()], InputType::SearchQuery)
            .await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Check that a response holds `expected` vectors of `dimensions` components.
pub fn check_embeddings(expected: usize, dimensions: usize, embeddings: &[Vec<i8>]) -> AppResult<()> {
    if embeddings.len() != expected {
        return Err(AppError::Embedding(format!(
            "Expected {} embeddings, got {}",
            expected,
            embeddings.len()
        )));
    }

    if let Some((index, bad)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, e)| e.len() != dimensions)
    {
        return Err(AppError::Embedding(format!(
            "Unexpected embedding dimensions at index {}: got {}, expected {}",
            index,
            bad.len(),
            dimensions
        )));
    }

    Ok(())
}
