//! Embedding integration crate for vecsearch.
//!
//! This crate provides a provider-agnostic abstraction for generating
//! reduced-precision (int8) text embeddings through an external service.
//!
//! # Providers
//! - **Cohere**: hosted embed API (default)
//! - **Mock**: deterministic offline embeddings for tests
//!
//! # Example
//! ```no_run
//! use vecsearch_embed::{EmbeddingClient, InputType, create_client};
//! use vecsearch_core::EmbeddingSettings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = EmbeddingSettings {
//!     api_key: std::env::var("COHERE_API_KEY").ok(),
//!     ..Default::default()
//! };
//! let client = create_client(&settings)?;
//! let vectors = client
//!     .embed_texts(&["Hello, world!".to_string()], InputType::SearchDocument)
//!     .await?;
//! assert_eq!(vectors[0].len(), 1024);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{check_embeddings, EmbedRequest, EmbedResponse, EmbedUsage, EmbeddingClient};
pub use factory::create_client;
pub use providers::{CohereClient, MockClient};
pub use types::{quantize_int8, EmbeddingType, InputType, ProviderType, Truncate};
