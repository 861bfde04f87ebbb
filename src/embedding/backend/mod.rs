//! Pluggable embedding backend system
//!
//! - **HTTP backend**: OpenAI-compatible APIs (OpenAI, Azure, LM Studio, vLLM, etc.)
//! - **Hash backend**: deterministic vectors for offline runs and tests
//!
//! ```toml
//! # OpenAI
//! [embedding]
//! backend = "http"
//! endpoint = "https://api.openai.com/v1/embeddings"
//! model = "text-embedding-3-small"
//! dimensions = 1536
//! # api_key from OPENAI_API_KEY env var
//!
//! # Offline
//! [embedding]
//! backend = "hash"
//! dimensions = 384
//! ```

mod factory;
mod hash;
mod http;
mod traits;

pub use factory::create_backend;
pub use hash::{hash_based_embedding, HashBackend};
pub use http::{HttpBackend, HttpConfig};
pub use traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};

use crate::types::Embedding;

/// Scale a vector to unit length; zero vectors are returned unchanged
pub(crate) fn normalize_embedding(embedding: Embedding) -> Embedding {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.into_iter().map(|x| x / norm).collect()
    } else {
        embedding
    }
}
