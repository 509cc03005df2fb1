//! Cohere embedding provider.
//!
//! Talks to the Cohere v2 embed endpoint and requests int8 embeddings.
//! API: https://docs.cohere.com/reference/embed

use crate::client::{EmbedRequest, EmbedResponse, EmbedUsage, EmbeddingClient};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use vecsearch_core::{AppError, AppResult, EmbeddingSettings};

/// Default Cohere API base URL
const DEFAULT_COHERE_URL: &str = "https://api.cohere.com";
const EMBED_ENDPOINT: &str = "/v2/embed";

/// Response from the Cohere embed API.
#[derive(Debug, Deserialize)]
struct CohereEmbedResponse {
    #[serde(default)]
    id: Option<String>,
    embeddings: CohereEmbeddings,
    #[serde(default)]
    meta: Option<CohereMeta>,
}

/// Embeddings keyed by requested type.
#[derive(Debug, Deserialize)]
struct CohereEmbeddings {
    #[serde(default)]
    int8: Option<Vec<Vec<i8>>>,
}

#[derive(Debug, Deserialize)]
struct CohereMeta {
    #[serde(default)]
    billed_units: Option<CohereBilledUnits>,
}

#[derive(Debug, Deserialize)]
struct CohereBilledUnits {
    #[serde(default)]
    input_tokens: Option<f64>,
}

/// Error body returned by Cohere.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Cohere embedding client.
#[derive(Debug, Clone)]
pub struct CohereClient {
    /// HTTP client
    client: Client,
    /// API base URL
    base_url: String,
    /// Bearer token
    api_key: String,
    /// Model name (e.g., "embed-english-v3.0")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

impl CohereClient {
    /// Create a new Cohere client from embedding settings.
    ///
    /// # Errors
    /// * `AppError::Config` - If the API key is missing
    /// * `AppError::Embedding` - If the HTTP client cannot be built
    pub fn new(settings: &EmbeddingSettings) -> AppResult<Self> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            AppError::Config("Cohere provider requires an API key".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_COHERE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        })
    }

    fn convert_response(&self, response: CohereEmbedResponse) -> AppResult<EmbedResponse> {
        let embeddings = response.embeddings.int8.ok_or_else(|| {
            AppError::Embedding("Cohere response contained no int8 embeddings".to_string())
        })?;

        let input_tokens = response
            .meta
            .and_then(|m| m.billed_units)
            .and_then(|b| b.input_tokens)
            .unwrap_or(0.0) as u32;

        Ok(EmbedResponse {
            id: response.id,
            embeddings,
            usage: EmbedUsage { input_tokens },
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for CohereClient {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, request), fields(batch_size = request.texts.len(), input_type = request.input_type.as_str(), model = %request.model))]
    async fn embed(&self, request: &EmbedRequest) -> AppResult<EmbedResponse> {
        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Cohere: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.message)
                .unwrap_or(error_text);

            return Err(AppError::Service {
                service: "cohere",
                status: status.as_u16(),
                message,
            });
        }

        let body: CohereEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse Cohere response: {}", e)))?;

        self.convert_response(body)
    }
}
