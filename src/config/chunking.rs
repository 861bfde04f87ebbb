//! Chunking configuration

use serde::{Deserialize, Serialize};

/// Largest accepted `chunk_size`, in characters
pub const MAX_CHUNK_SIZE: usize = 100_000;

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters repeated between consecutive chunks of a page
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Describe every problem with this configuration
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.chunk_size == 0 {
            errors.push("chunk_size must be positive".to_string());
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            errors.push(format!("chunk_size must be <= {}", MAX_CHUNK_SIZE));
        }
        if self.chunk_overlap >= self.chunk_size {
            errors.push(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        errors
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}
