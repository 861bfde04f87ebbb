//! pdfchunk: PDF text extraction and overlapping chunking for retrieval
//!
//! - Per-page text extraction and normalization via lopdf
//! - Sentence-aware, overlapping chunking with page attribution
//! - Document lifecycle tracking in an embedded sled store
//! - Batched embeddings through OpenAI-compatible HTTP APIs

pub mod chunking;
pub mod config;
pub mod content;
pub mod embedding;
pub mod processor;
pub mod store;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
