//! Index schema definitions.
//!
//! Mirrors the search service's index definition JSON so a schema can be
//! sent as-is to the create-or-update endpoint.

use serde::{Deserialize, Serialize};
use vecsearch_core::{AppConfig, AppError, AppResult, HnswSettings};

/// Name of the document key field.
pub const ID_FIELD: &str = "id";

/// Name of the searchable text field.
pub const TEXT_FIELD: &str = "text";

/// Name of the int8 vector field.
pub const EMBEDDING_FIELD: &str = "embedding";

/// Vector search profile attached to the embedding field.
pub const DEFAULT_PROFILE: &str = "my-vector-config";

/// HNSW algorithm configuration referenced by the profile.
pub const DEFAULT_ALGORITHM: &str = "my-hnsw";

/// Largest vector dimensionality the service accepts.
pub const MAX_DIMENSIONS: usize = 4096;

/// Index definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSchema {
    /// Index name
    pub name: String,

    /// Field definitions
    pub fields: Vec<SearchField>,

    /// Vector search algorithms and profiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search: Option<VectorSearch>,
}

/// A single field of the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchField {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub key: bool,

    #[serde(default)]
    pub searchable: bool,

    #[serde(default)]
    pub filterable: bool,

    #[serde(default = "default_true")]
    pub retrievable: bool,

    /// Vector dimensionality (vector fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,

    /// Vector search profile name (vector fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_search_profile: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Entity data model types used by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "Edm.String")]
    String,

    /// Signed 8-bit vector components
    #[serde(rename = "Collection(Edm.SByte)")]
    SByteVector,

    /// 32-bit float vector components
    #[serde(rename = "Collection(Edm.Single)")]
    SingleVector,
}

impl FieldType {
    /// Whether fields of this type hold vectors.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::SByteVector | Self::SingleVector)
    }
}

/// Vector search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSearch {
    pub algorithms: Vec<VectorSearchAlgorithm>,
    pub profiles: Vec<VectorSearchProfile>,
}

/// Named nearest-neighbor algorithm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorSearchAlgorithm {
    pub name: String,

    pub kind: AlgorithmKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hnsw_parameters: Option<HnswParameters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmKind {
    Hnsw,
    ExhaustiveKnn,
}

/// HNSW graph parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HnswParameters {
    /// Bi-directional links per node (4..=10)
    pub m: u32,
    /// Candidate list size at build time (100..=1000)
    pub ef_construction: u32,
    /// Candidate list size at query time (100..=1000)
    pub ef_search: u32,
    pub metric: VectorMetric,
}

impl HnswParameters {
    /// Build parameters from configuration.
    pub fn from_settings(settings: &HnswSettings) -> AppResult<Self> {
        let metric = VectorMetric::parse(&settings.metric).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown vector metric: '{}'. Supported: cosine, euclidean, dotProduct, hamming",
                settings.metric
            ))
        })?;

        Ok(Self {
            m: settings.m,
            ef_construction: settings.ef_construction,
            ef_search: settings.ef_search,
            metric,
        })
    }

    fn validate(&self, algorithm: &str) -> AppResult<()> {
        let checks = [
            ("m", self.m, 4, 10),
            ("efConstruction", self.ef_construction, 100, 1000),
            ("efSearch", self.ef_search, 100, 1000),
        ];

        for (name, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(AppError::Precondition(format!(
                    "Algorithm '{}': {} must be in {}..={}, got {}",
                    algorithm, name, min, max, value
                )));
            }
        }

        Ok(())
    }
}

/// Similarity metric used by the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorMetric {
    Cosine,
    Euclidean,
    DotProduct,
    Hamming,
}

impl VectorMetric {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Some(Self::Cosine),
            "euclidean" => Some(Self::Euclidean),
            "dotproduct" | "dot_product" | "dot" => Some(Self::DotProduct),
            "hamming" => Some(Self::Hamming),
            _ => None,
        }
    }
}

/// Named binding from vector fields to an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchProfile {
    pub name: String,
    pub algorithm: String,
}

impl IndexSchema {
    /// Schema described by the configuration. Needs no credentials.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let hnsw = HnswParameters::from_settings(&config.search.hnsw)?;
        Ok(Self::int8_documents(
            config.search.index_name.clone(),
            config.embedding.dimensions,
            hnsw,
        ))
    }

    /// Schema for int8 documents: `id` key, searchable `text`, and an
    /// `embedding` vector of `dimensions` signed bytes behind an HNSW profile.
    pub fn int8_documents(
        name: impl Into<String>,
        dimensions: usize,
        hnsw: HnswParameters,
    ) -> Self {
        Self {
            name: name.into(),
            fields: vec![
                SearchField {
                    name: ID_FIELD.to_string(),
                    field_type: FieldType::String,
                    key: true,
                    searchable: false,
                    filterable: true,
                    retrievable: true,
                    dimensions: None,
                    vector_search_profile: None,
                },
                SearchField {
                    name: TEXT_FIELD.to_string(),
                    field_type: FieldType::String,
                    key: false,
                    searchable: true,
                    filterable: false,
                    retrievable: true,
                    dimensions: None,
                    vector_search_profile: None,
                },
                SearchField {
                    name: EMBEDDING_FIELD.to_string(),
                    field_type: FieldType::SByteVector,
                    key: false,
                    searchable: true,
                    filterable: false,
                    retrievable: true,
                    dimensions: Some(dimensions),
                    vector_search_profile: Some(DEFAULT_PROFILE.to_string()),
                },
            ],
            vector_search: Some(VectorSearch {
                algorithms: vec![VectorSearchAlgorithm {
                    name: DEFAULT_ALGORITHM.to_string(),
                    kind: AlgorithmKind::Hnsw,
                    hnsw_parameters: Some(hnsw),
                }],
                profiles: vec![VectorSearchProfile {
                    name: DEFAULT_PROFILE.to_string(),
                    algorithm: DEFAULT_ALGORITHM.to_string(),
                }],
            }),
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&SearchField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The key field, if exactly one is declared.
    pub fn key_field(&self) -> Option<&SearchField> {
        let mut keys = self.fields.iter().filter(|f| f.key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key),
            _ => None,
        }
    }

    /// Dimensionality of a vector field.
    pub fn vector_dimensions(&self, field: &str) -> Option<usize> {
        self.field(field)
            .filter(|f| f.field_type.is_vector())
            .and_then(|f| f.dimensions)
    }

    /// Check the schema locally before it is sent to the service.
    pub fn validate(&self) -> AppResult<()> {
        validate_index_name(&self.name)?;

        let key_count = self.fields.iter().filter(|f| f.key).count();
        if key_count != 1 {
            return Err(AppError::Precondition(format!(
                "Index '{}' must declare exactly one key field, found {}",
                self.name, key_count
            )));
        }

        if let Some(key) = self.key_field() {
            if key.field_type != FieldType::String {
                return Err(AppError::Precondition(format!(
                    "Key field '{}' must be of type Edm.String",
                    key.name
                )));
            }
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(AppError::Precondition(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }

            if field.field_type.is_vector() {
                self.validate_vector_field(field)?;
            }
        }

        if let Some(vector_search) = &self.vector_search {
            for profile in &vector_search.profiles {
                if !vector_search
                    .algorithms
                    .iter()
                    .any(|a| a.name == profile.algorithm)
                {
                    return Err(AppError::Precondition(format!(
                        "Profile '{}' references unknown algorithm '{}'",
                        profile.name, profile.algorithm
                    )));
                }
            }

            for algorithm in &vector_search.algorithms {
                if let Some(params) = &algorithm.hnsw_parameters {
                    params.validate(&algorithm.name)?;
                }
            }
        }

        Ok(())
    }

    fn validate_vector_field(&self, field: &SearchField) -> AppResult<()> {
        match field.dimensions {
            Some(d) if (1..=MAX_DIMENSIONS).contains(&d) => {}
            other => {
                return Err(AppError::Precondition(format!(
                    "Vector field '{}' needs dimensions in 1..={}, got {:?}",
                    field.name, MAX_DIMENSIONS, other
                )))
            }
        }

        if !field.searchable {
            return Err(AppError::Precondition(format!(
                "Vector field '{}' must be searchable",
                field.name
            )));
        }

        let profile = field.vector_search_profile.as_deref().ok_or_else(|| {
            AppError::Precondition(format!(
                "Vector field '{}' has no vector search profile",
                field.name
            ))
        })?;

        let known = self
            .vector_search
            .as_ref()
            .map(|vs| vs.profiles.iter().any(|p| p.name == profile))
            .unwrap_or(false);

        if !known {
            return Err(AppError::Precondition(format!(
                "Vector field '{}' references unknown profile '{}'",
                field.name, profile
            )));
        }

        Ok(())
    }
}

/// Index names are lowercase letters, digits or dashes, at most 128
/// characters, without leading, trailing or doubled dashes.
pub fn validate_index_name(name: &str) -> AppResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");

    if valid {
        Ok(())
    } else {
        Err(AppError::Precondition(format!("Invalid index name '{}'", name)))
    }
}
