//! Embedding provider factory.
//!
//! Builds an embedding client from the embedding settings of the
//! application configuration.

use crate::client::EmbeddingClient;
use crate::providers::{CohereClient, MockClient};
use crate::types::ProviderType;
use std::sync::Arc;
use vecsearch_core::{AppError, AppResult, EmbeddingSettings};

/// Create an embedding client for the configured provider.
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
/// - Client initialization fails
pub fn create_client(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingClient>> {
    let provider = ProviderType::parse(&settings.provider).ok_or_else(|| {
        AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: cohere, mock",
            settings.provider
        ))
    })?;

    tracing::debug!(
        provider = provider.as_str(),
        model = %settings.model,
        dimensions = settings.dimensions,
        "Creating embedding client"
    );

    match provider {
        ProviderType::Cohere => Ok(Arc::new(CohereClient::new(settings)?)),
        ProviderType::Mock => Ok(Arc::new(MockClient::new(
            settings.model.clone(),
            settings.dimensions,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_client() {
        let settings = EmbeddingSettings {
            provider: "mock".to_string(),
            dimensions: 384,
            ..Default::default()
        };
        let client = create_client(&settings).unwrap();
        assert_eq!(client.provider_name(), "mock");
        assert_eq!(client.dimensions(), 384);
    }

    #[test]
    fn test_cohere_requires_api_key() {
        match create_client(&EmbeddingSettings::default()) {
            Err(err) => assert!(err.to_string().contains("requires an API key")),
            Ok(_) => panic!("Expected error for Cohere without API key"),
        }
    }

    #[test]
    fn test_create_cohere_client() {
        let settings = EmbeddingSettings {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let client = create_client(&settings).unwrap();
        assert_eq!(client.provider_name(), "cohere");
        assert_eq!(client.model_name(), "embed-english-v3.0");
    }

    #[test]
    fn test_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "unknown".to_string(),
            ..Default::default()
        };
        match create_client(&settings) {
            Err(err) => assert!(err.to_string().contains("Unknown embedding provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
