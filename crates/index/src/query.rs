//! Vector query request and result types.

use crate::schema::EMBEDDING_FIELD;
use serde::{Deserialize, Serialize};

/// Top-k nearest-neighbor request against one vector field.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    /// Query embedding
    pub vector: Vec<i8>,

    /// Number of neighbors to return
    pub k: usize,

    /// Vector field to search
    pub field: String,

    /// Bypass the ANN graph and compare against every vector
    pub exhaustive: bool,
}

impl VectorQuery {
    /// Query the default embedding field.
    pub fn new(vector: Vec<i8>, k: usize) -> Self {
        Self {
            vector,
            k,
            field: EMBEDDING_FIELD.to_string(),
            exhaustive: false,
        }
    }

    /// Request an exhaustive (exact) search.
    pub fn exhaustive(mut self) -> Self {
        self.exhaustive = true;
        self
    }
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document key
    pub id: String,

    /// Document text
    pub text: String,

    /// Similarity score, higher is closer
    pub score: f64,
}
