//! In-process vector index.
//!
//! Keeps documents in memory and answers queries by exact cosine
//! similarity. Enforces the same contract as the hosted service: schema
//! updates may add fields but not change existing ones, rows with a
//! wrong vector length are rejected, and query vectors must match the
//! field dimensionality.

use crate::document::{Document, IndexingResult};
use crate::query::{SearchHit, VectorQuery};
use crate::schema::{IndexSchema, VectorMetric};
use crate::vector_index::VectorIndex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use vecsearch_core::{AppError, AppResult};

#[derive(Debug)]
struct IndexState {
    schema: IndexSchema,
    documents: BTreeMap<String, Document>,
}

/// Memory-backed vector index, used offline and in tests.
#[derive(Debug)]
pub struct InMemoryIndex {
    index_name: String,
    state: RwLock<Option<IndexState>>,
}

impl InMemoryIndex {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            state: RwLock::new(None),
        }
    }

    /// Current schema, if the index exists.
    pub async fn schema(&self) -> Option<IndexSchema> {
        self.state.read().await.as_ref().map(|s| s.schema.clone())
    }

    fn not_found(&self) -> AppError {
        AppError::Search(format!("Index '{}' not found", self.index_name))
    }
}

/// Reject updates that change a field already present in the index.
fn check_compatible(current: &IndexSchema, next: &IndexSchema) -> AppResult<()> {
    for field in &current.fields {
        let Some(updated) = next.field(&field.name) else {
            return Err(AppError::Search(format!(
                "Field '{}' cannot be removed from an existing index",
                field.name
            )));
        };

        if updated.field_type != field.field_type
            || updated.key != field.key
            || updated.dimensions != field.dimensions
        {
            return Err(AppError::Search(format!(
                "Existing field '{}' cannot be changed",
                field.name
            )));
        }
    }
    Ok(())
}

/// Metric configured for the profile of `field`, defaulting to cosine.
fn field_metric(schema: &IndexSchema, field: &str) -> VectorMetric {
    let profile = schema
        .field(field)
        .and_then(|f| f.vector_search_profile.as_deref());

    schema
        .vector_search
        .as_ref()
        .and_then(|vs| {
            let profile = vs.profiles.iter().find(|p| Some(p.name.as_str()) == profile)?;
            vs.algorithms.iter().find(|a| a.name == profile.algorithm)
        })
        .and_then(|a| a.hnsw_parameters.as_ref())
        .map(|p| p.metric)
        .unwrap_or(VectorMetric::Cosine)
}

/// Similarity score, higher is closer.
///
/// Distances are mapped to `1 / (1 + distance)` the way the hosted
/// service reports `@search.score`; dot product is reported raw.
pub fn similarity(metric: VectorMetric, a: &[i8], b: &[i8]) -> f64 {
    let pairs = a.iter().zip(b).map(|(x, y)| (*x as f64, *y as f64));

    match metric {
        VectorMetric::Cosine => {
            let (dot, na, nb) = pairs.fold((0.0, 0.0, 0.0), |(d, na, nb), (x, y)| {
                (d + x * y, na + x * x, nb + y * y)
            });
            let cosine = if na == 0.0 || nb == 0.0 {
                0.0
            } else {
                dot / (na.sqrt() * nb.sqrt())
            };
            1.0 / (1.0 + (1.0 - cosine))
        }
        VectorMetric::Euclidean => {
            let distance = pairs.map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt();
            1.0 / (1.0 + distance)
        }
        VectorMetric::DotProduct => pairs.map(|(x, y)| x * y).sum(),
        VectorMetric::Hamming => {
            let distance: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
            1.0 / (1.0 + distance as f64)
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn create_or_update_index(&self, schema: &IndexSchema) -> AppResult<()> {
        if schema.name != self.index_name {
            return Err(AppError::Precondition(format!(
                "Schema is for index '{}' but client targets '{}'",
                schema.name, self.index_name
            )));
        }
        schema.validate()?;

        let mut state = self.state.write().await;
        match state.as_mut() {
            Some(existing) => {
                check_compatible(&existing.schema, schema)?;
                existing.schema = schema.clone();
                tracing::debug!("Updated in-memory index '{}'", self.index_name);
            }
            None => {
                *state = Some(IndexState {
                    schema: schema.clone(),
                    documents: BTreeMap::new(),
                });
                tracing::debug!("Created in-memory index '{}'", self.index_name);
            }
        }

        Ok(())
    }

    async fn delete_index(&self) -> AppResult<()> {
        *self.state.write().await = None;
        Ok(())
    }

    async fn upload_documents(&self, documents: &[Document]) -> AppResult<Vec<IndexingResult>> {
        let mut guard = self.state.write().await;
        let state = guard.as_mut().ok_or_else(|| self.not_found())?;

        let key_field = state
            .schema
            .key_field()
            .map(|f| f.name.clone())
            .unwrap_or_default();
        let vector_fields: Vec<(String, usize)> = state
            .schema
            .fields
            .iter()
            .filter(|f| f.field_type.is_vector())
            .filter_map(|f| f.dimensions.map(|d| (f.name.clone(), d)))
            .collect();

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            if document.id.is_empty() {
                results.push(IndexingResult::failed(
                    "",
                    400,
                    format!("Document key '{}' must not be empty", key_field),
                ));
                continue;
            }

            if let Some((name, dims)) = vector_fields
                .iter()
                .find(|(_, d)| *d != document.embedding.len())
            {
                results.push(IndexingResult::failed(
                    document.id.clone(),
                    400,
                    format!(
                        "The vector field '{}' expects a length of {}, got {}",
                        name,
                        dims,
                        document.embedding.len()
                    ),
                ));
                continue;
            }

            let existed = state
                .documents
                .insert(document.id.clone(), document.clone())
                .is_some();
            results.push(IndexingResult::succeeded(
                document.id.clone(),
                if existed { 200 } else { 201 },
            ));
        }

        Ok(results)
    }

    async fn search(&self, query: &VectorQuery) -> AppResult<Vec<SearchHit>> {
        if query.k == 0 {
            return Err(AppError::Precondition("k must be at least 1".to_string()));
        }

        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or_else(|| self.not_found())?;

        let dims = state.schema.vector_dimensions(&query.field).ok_or_else(|| {
            AppError::Search(format!("Unknown vector field '{}'", query.field))
        })?;
        if query.vector.len() != dims {
            return Err(AppError::Search(format!(
                "The vector field '{}' expects a length of {}, but the query vector has {}",
                query.field,
                dims,
                query.vector.len()
            )));
        }

        let metric = field_metric(&state.schema, &query.field);

        let mut hits: Vec<SearchHit> = state
            .documents
            .values()
            .map(|doc| SearchHit {
                id: doc.id.clone(),
                text: doc.text.clone(),
                score: similarity(metric, &query.vector, &doc.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(query.k);

        Ok(hits)
    }

    async fn document_count(&self) -> AppResult<u64> {
        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or_else(|| self.not_found())?;
        Ok(state.documents.len() as u64)
    }
}
