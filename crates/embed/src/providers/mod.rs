//! Embedding provider implementations.

pub mod cohere;
pub mod mock;

pub use cohere::CohereClient;
pub use mock::MockClient;
