//! Vector index management and similarity search.
//!
//! Declares an index schema for int8 embeddings on a hosted search
//! service, upserts documents with their embeddings, and runs top-k
//! nearest-neighbor queries. The ANN algorithm itself lives in the
//! service; this crate only configures and calls it.
//!
//! # Example
//! ```no_run
//! use vecsearch_core::AppConfig;
//! use vecsearch_index::Pipeline;
//!
//! # async fn example() -> vecsearch_core::AppResult<()> {
//! let config = AppConfig::load(None)?;
//! config.validate()?;
//!
//! let pipeline = Pipeline::from_config(&config)?;
//! pipeline.define_index().await?;
//! pipeline.index_texts(&["Hello world".to_string()]).await?;
//! for hit in pipeline.query("greeting", 3).await? {
//!     println!("{:.4} {}", hit.score, hit.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod azure_index;
pub mod document;
pub mod memory_index;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod vector_index;


// Re-export commonly used types
pub use azure_index::AzureSearchIndex;
pub use document::{build_documents, content_hash, Document, IdStrategy, IndexingResult};
pub use memory_index::InMemoryIndex;
pub use pipeline::{IndexStats, Pipeline};
pub use query::{SearchHit, VectorQuery};
pub use schema::{HnswParameters, IndexSchema, VectorMetric};
pub use vector_index::{create_index, VectorIndex};
