//! Deterministic hash-based embedding backend
//!
//! Vectors are derived from xxh3 hashes of the text. They are stable for the
//! same input but carry no semantic meaning, so this backend is only useful
//! offline and in tests.

use super::normalize_embedding;
use super::traits::{EmbeddingBackend, EmbeddingResult};
use crate::types::Embedding;
use xxhash_rust::xxh3::xxh3_64_with_seed;

#[derive(Debug, Clone)]
pub struct HashBackend {
    dimensions: usize,
}

impl HashBackend {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

/// Unit-length vector with components seeded by their position
pub fn hash_based_embedding(content: &str, dims: usize) -> Embedding {
    let raw: Embedding = (0..dims)
        .map(|i| {
            let hash = xxh3_64_with_seed(content.as_bytes(), i as u64);
            ((hash % 2000) as f32 / 1000.0) - 1.0
        })
        .collect();
    normalize_embedding(raw)
}

impl EmbeddingBackend for HashBackend {
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        Ok(hash_based_embedding(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}
