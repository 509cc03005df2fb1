//! Azure AI Search backed vector index.
//!
//! Uses the REST API directly: index definitions under `/indexes/{name}`,
//! document batches under `/docs/index` and vector queries under
//! `/docs/search`. Every request carries the admin key in the `api-key`
//! header and the configured `api-version`.

use crate::document::{Document, IndexingResult};
use crate::query::{SearchHit, VectorQuery};
use crate::schema::{IndexSchema, ID_FIELD, TEXT_FIELD};
use crate::vector_index::VectorIndex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use vecsearch_core::{AppError, AppResult, SearchSettings};

const SERVICE: &str = "azure-search";

/// Upsert action for every uploaded row.
const UPLOAD_ACTION: &str = "mergeOrUpload";

/// Row of a document batch.
#[derive(Debug, Serialize)]
struct IndexBatchItem<'a> {
    #[serde(rename = "@search.action")]
    action: &'static str,
    #[serde(flatten)]
    document: &'a Document,
}

#[derive(Debug, Serialize)]
struct IndexBatch<'a> {
    value: Vec<IndexBatchItem<'a>>,
}

#[derive(Debug, Deserialize)]
struct IndexBatchResponse {
    value: Vec<IndexingResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    select: String,
    top: usize,
    vector_queries: Vec<VectorQueryBody<'a>>,
}

#[derive(Debug, Serialize)]
struct VectorQueryBody<'a> {
    kind: &'static str,
    vector: &'a [i8],
    k: usize,
    fields: &'a str,
    exhaustive: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    value: Vec<SearchResultRow>,
}

#[derive(Debug, Deserialize)]
struct SearchResultRow {
    #[serde(rename = "@search.score")]
    score: f64,
    id: String,
    #[serde(default)]
    text: String,
}

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Vector index hosted by an Azure AI Search service.
#[derive(Debug, Clone)]
pub struct AzureSearchIndex {
    client: Client,
    endpoint: String,
    admin_key: String,
    index_name: String,
    api_version: String,
}

impl AzureSearchIndex {
    /// Create a client for the configured service and index.
    ///
    /// # Errors
    /// * `AppError::Config` - If the endpoint or admin key is missing
    pub fn new(settings: &SearchSettings) -> AppResult<Self> {
        let endpoint = settings.endpoint.clone().ok_or_else(|| {
            AppError::Config("Azure search backend requires an endpoint".to_string())
        })?;
        let admin_key = settings.admin_key.clone().ok_or_else(|| {
            AppError::Config("Azure search backend requires an admin key".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Search(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            admin_key,
            index_name: settings.index_name.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn index_url(&self) -> String {
        format!("{}/indexes/{}", self.endpoint, self.index_name)
    }

    fn docs_url(&self, operation: &str) -> String {
        format!("{}/docs/{}", self.index_url(), operation)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("api-key", &self.admin_key)
            .query(&[("api-version", self.api_version.as_str())])
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        self.authorize(builder)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send request to search service: {}", e)))
    }
}

/// Convert a non-success response into a service error.
async fn service_error(response: Response) -> AppError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
        Ok(ErrorResponse {
            error: ErrorDetail {
                code: Some(code),
                message,
            },
        }) if !code.is_empty() => format!("{}: {}", code, message),
        Ok(body) => body.error.message,
        Err(_) => error_text,
    };

    AppError::Service {
        service: SERVICE,
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl VectorIndex for AzureSearchIndex {
    fn backend_name(&self) -> &str {
        "azure"
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    #[instrument(skip(self, schema), fields(index = %schema.name, fields = schema.fields.len()))]
    async fn create_or_update_index(&self, schema: &IndexSchema) -> AppResult<()> {
        if schema.name != self.index_name {
            return Err(AppError::Precondition(format!(
                "Schema is for index '{}' but client targets '{}'",
                schema.name, self.index_name
            )));
        }
        schema.validate()?;

        debug!("Creating or updating index at {}", self.index_url());

        let response = self.send(self.client.put(self.index_url()).json(schema)).await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        debug!(status = %response.status(), "Index definition applied");
        Ok(())
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn delete_index(&self) -> AppResult<()> {
        let response = self.send(self.client.delete(self.index_url())).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!("Index '{}' did not exist", self.index_name);
                Ok(())
            }
            _ => Err(service_error(response).await),
        }
    }

    #[instrument(skip(self, documents), fields(index = %self.index_name, batch_size = documents.len()))]
    async fn upload_documents(&self, documents: &[Document]) -> AppResult<Vec<IndexingResult>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let batch = IndexBatch {
            value: documents
                .iter()
                .map(|document| IndexBatchItem {
                    action: UPLOAD_ACTION,
                    document,
                })
                .collect(),
        };

        let response = self
            .send(self.client.post(self.docs_url("index")).json(&batch))
            .await?;

        // 207 means some rows failed; the body still lists every row
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::MULTI_STATUS {
            return Err(service_error(response).await);
        }

        let body: IndexBatchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse indexing response: {}", e)))?;

        debug!(rows = body.value.len(), %status, "Document batch indexed");
        Ok(body.value)
    }

    #[instrument(skip(self, query), fields(index = %self.index_name, k = query.k, field = %query.field))]
    async fn search(&self, query: &VectorQuery) -> AppResult<Vec<SearchHit>> {
        if query.k == 0 {
            return Err(AppError::Precondition("k must be at least 1".to_string()));
        }

        let request = SearchRequest {
            select: format!("{},{}", ID_FIELD, TEXT_FIELD),
            top: query.k,
            vector_queries: vec![VectorQueryBody {
                kind: "vector",
                vector: &query.vector,
                k: query.k,
                fields: &query.field,
                exhaustive: query.exhaustive,
            }],
        };

        let response = self
            .send(self.client.post(self.docs_url("search")).json(&request))
            .await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))?;

        Ok(body
            .value
            .into_iter()
            .map(|row| SearchHit {
                id: row.id,
                text: row.text,
                score: row.score,
            })
            .collect())
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn document_count(&self) -> AppResult<u64> {
        let response = self.send(self.client.get(self.docs_url("$count"))).await?;

        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read count response: {}", e)))?;

        text.trim_start_matches('\u{feff}')
            .trim()
            .parse()
            .map_err(|e| AppError::Search(format!("Invalid document count '{}': {}", text, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::HnswParameters;
    use vecsearch_core::HnswSettings;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(endpoint: &str) -> SearchSettings {
        SearchSettings {
            endpoint: Some(endpoint.to_string()),
            admin_key: Some("admin".to_string()),
            index_name: "int8-index".to_string(),
            ..Default::default()
        }
    }

    fn schema(name: &str) -> IndexSchema {
        let hnsw = HnswParameters::from_settings(&HnswSettings::default()).unwrap();
        IndexSchema::int8_documents(name, 3, hnsw)
    }

    #[test]
    fn test_requires_endpoint_and_key() {
        let mut s = settings("http://localhost");
        s.admin_key = None;
        assert!(AzureSearchIndex::new(&s).is_err());

        let mut s = settings("http://localhost");
        s.endpoint = None;
        assert!(AzureSearchIndex::new(&s).is_err());
    }

    #[test]
    fn test_urls() {
        let index = AzureSearchIndex::new(&settings("https://svc.search.windows.net/")).unwrap();
        assert_eq!(
            index.index_url(),
            "https://svc.search.windows.net/indexes/int8-index"
        );
        assert_eq!(
            index.docs_url("search"),
            "https://svc.search.windows.net/indexes/int8-index/docs/search"
        );
    }

    #[tokio::test]
    async fn test_create_or_update_index() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/indexes/int8-index"))
            .and(header("api-key", "admin"))
            .and(query_param("api-version", "2024-07-01"))
            .and(body_partial_json(serde_json::json!({
                "name": "int8-index",
                "vectorSearch": { "profiles": [{ "name": "my-vector-config" }] }
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        index.create_or_update_index(&schema("int8-index")).await.unwrap();
        index.create_or_update_index(&schema("int8-index")).await.unwrap();
    }

    #[tokio::test]
    async fn test_schema_for_other_index_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        let err = index
            .create_or_update_index(&schema("other-index"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_merge_or_upload_rows() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/indexes/int8-index/docs/index"))
            .and(body_partial_json(serde_json::json!({
                "value": [{
                    "@search.action": "mergeOrUpload",
                    "id": "0",
                    "text": "alpha",
                    "embedding": [1, -2, 3]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{ "key": "0", "status": true, "errorMessage": null, "statusCode": 201 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        let results = index
            .upload_documents(&[Document {
                id: "0".to_string(),
                text: "alpha".to_string(),
                embedding: vec![1, -2, 3],
            }])
            .await
            .unwrap();

        assert_eq!(results, vec![IndexingResult::succeeded("0", 201)]);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_per_row() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/indexes/int8-index/docs/index"))
            .respond_with(ResponseTemplate::new(207).set_body_json(serde_json::json!({
                "value": [
                    { "key": "0", "status": true, "statusCode": 200 },
                    { "key": "1", "status": false, "errorMessage": "Invalid vector", "statusCode": 400 }
                ]
            })))
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        let docs = vec![
            Document {
                id: "0".to_string(),
                text: "a".to_string(),
                embedding: vec![1, 1, 1],
            },
            Document {
                id: "1".to_string(),
                text: "b".to_string(),
                embedding: vec![1, 1, 1],
            },
        ];
        let results = index.upload_documents(&docs).await.unwrap();
        assert!(results[0].status);
        assert!(!results[1].status);
        assert_eq!(results[1].error_message.as_deref(), Some("Invalid vector"));
    }

    #[tokio::test]
    async fn test_search_reads_scores() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/indexes/int8-index/docs/search"))
            .and(body_partial_json(serde_json::json!({
                "select": "id,text",
                "top": 2,
                "vectorQueries": [{ "kind": "vector", "vector": [1, 2, 3], "k": 2, "fields": "embedding" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "@search.score": 0.91, "id": "a", "text": "alpha" },
                    { "@search.score": 0.42, "id": "b", "text": "beta" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        let hits = index.search(&VectorQuery::new(vec![1, 2, 3], 2)).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "alpha");
        assert!((hits[0].score - 0.91).abs() < f64::EPSILON);
        assert_eq!(hits[1].id, "b");
    }

    #[tokio::test]
    async fn test_service_error_keeps_code_and_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/indexes/int8-index/docs/search"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": "InvalidRequestParameter",
                    "message": "The vector field 'embedding' with dimensionality of 3 expects a length of 3. However, the provided vector has a length of 2."
                }
            })))
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        let err = index
            .search(&VectorQuery::new(vec![1, 2], 1))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("InvalidRequestParameter: The vector field"));
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_ok() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/indexes/int8-index"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        assert!(index.delete_index().await.is_ok());
    }

    #[tokio::test]
    async fn test_document_count() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/indexes/int8-index/docs/$count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\u{feff}42"))
            .mount(&server)
            .await;

        let index = AzureSearchIndex::new(&settings(&server.uri())).unwrap();
        assert_eq!(index.document_count().await.unwrap(), 42);
    }
}
