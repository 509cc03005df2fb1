//! Mock embedding provider using trigram-based content-aware embeddings.

use crate::client::{EmbedRequest, EmbedResponse, EmbedUsage, EmbeddingClient};
use crate::types::quantize_int8;
use std::collections::{HashMap, HashSet};
use vecsearch_core::AppResult;

/// Offline provider for tests and local runs.
///
/// Generates deterministic int8 embeddings from character trigrams and
/// word frequencies. Not semantically accurate like a real model, but
/// texts sharing vocabulary land close together, which is enough to
/// exercise indexing and ranking end to end. Document and query modes
/// produce the same vector.
#[derive(Debug)]
pub struct MockClient {
    model: String,
    dimensions: usize,
}

impl MockClient {
    /// Create a new mock provider with specified dimensions.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
        }
    }

    /// Unit-length float embedding before quantization.
    fn float_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();

        let stop_words: HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them",
        ]
        .into_iter()
        .collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % self.dimensions] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, request: &EmbedRequest) -> AppResult<EmbedResponse> {
        let embeddings = request
            .texts
            .iter()
            .map(|text| quantize_int8(&self.float_embedding(text)))
            .collect();

        let input_tokens = request
            .texts
            .iter()
            .map(|t| t.split_whitespace().count() as u32)
            .sum();

        Ok(EmbedResponse {
            id: None,
            embeddings,
            usage: EmbedUsage { input_tokens },
        })
    }
}
