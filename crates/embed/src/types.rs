//! Embedding wire types shared by all providers.

use serde::{Deserialize, Serialize};

/// What the embedded text will be used for.
///
/// Retrieval models embed documents and queries differently, so the
/// same string can yield different vectors per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Text that will be stored in the index
    SearchDocument,
    /// Text used to search the index
    SearchQuery,
    Classification,
    Clustering,
}

impl InputType {
    /// Parse an input type from a CLI-friendly string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "document" | "search_document" | "doc" => Some(Self::SearchDocument),
            "query" | "search_query" => Some(Self::SearchQuery),
            "classification" => Some(Self::Classification),
            "clustering" => Some(Self::Clustering),
            _ => None,
        }
    }

    /// Wire name of the input type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchDocument => "search_document",
            Self::SearchQuery => "search_query",
            Self::Classification => "classification",
            Self::Clustering => "clustering",
        }
    }
}

/// Numeric encoding requested from the embedding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingType {
    /// Signed 8-bit integers in `-128..=127`
    Int8,
    Float,
}

/// How the service should handle inputs longer than the model context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Truncate {
    None,
    Start,
    End,
}

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Cohere,
    Mock,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cohere" => Some(Self::Cohere),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cohere => "cohere",
            Self::Mock => "mock",
        }
    }
}

/// Quantize a float vector with components in `[-1.0, 1.0]` to int8.
///
/// Values outside the unit range saturate at the int8 bounds.
pub fn quantize_int8(vector: &[f32]) -> Vec<i8> {
    vector
        .iter()
        .map(|v| (v * 127.0).round().clamp(-128.0, 127.0) as i8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_type_parsing() {
        assert_eq!(InputType::parse("document"), Some(InputType::SearchDocument));
        assert_eq!(InputType::parse("QUERY"), Some(InputType::SearchQuery));
        assert_eq!(InputType::parse("search_query"), Some(InputType::SearchQuery));
        assert_eq!(InputType::parse("rerank"), None);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(InputType::SearchDocument).unwrap(),
            serde_json::json!("search_document")
        );
        assert_eq!(
            serde_json::to_value(EmbeddingType::Int8).unwrap(),
            serde_json::json!("int8")
        );
        assert_eq!(
            serde_json::to_value(Truncate::End).unwrap(),
            serde_json::json!("END")
        );
    }

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("Cohere"), Some(ProviderType::Cohere));
        assert_eq!(ProviderType::parse("mock"), Some(ProviderType::Mock));
        assert_eq!(ProviderType::parse("ollama"), None);
    }

    #[test]
    fn test_quantize_int8_saturates() {
        let q = quantize_int8(&[0.0, 1.0, -1.0, 0.5, 3.0, -3.0]);
        assert_eq!(q, vec![0, 127, -127, 64, 127, -128]);
    }
}
