//! Embeddings for stored chunks
//!
//! Backends turn text into vectors; [`ChunkEmbedder`] walks a document's
//! stored chunks and attaches the vectors in batches.
//!
//! ## OpenAI API
//! ```toml
//! [embedding]
//! backend = "http"
//! endpoint = "https://api.openai.com/v1/embeddings"
//! model = "text-embedding-3-small"
//! dimensions = 1536
//! batch_size = 100
//! batch_delay_ms = 500
//! ```
//!
//! ## Local LM Studio / vLLM
//! ```toml
//! [embedding]
//! backend = "http"
//! endpoint = "http://localhost:1234/v1/embeddings"
//! model = "nomic-embed-text-v1.5"
//! dimensions = 768
//! ```

pub mod backend;
mod embedder;

pub use backend::{
    create_backend, hash_based_embedding, EmbeddingBackend, EmbeddingError, EmbeddingResult,
    HashBackend, HttpBackend, HttpConfig,
};
pub use embedder::{ChunkEmbedder, EmbedAllReport};
