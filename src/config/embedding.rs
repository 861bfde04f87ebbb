//! Embedding backend configuration

use serde::{Deserialize, Serialize};

/// Default timeout for HTTP backend requests
fn default_timeout() -> u64 {
    30
}

/// Default number of chunks sent per embedding request
fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

/// Which embedding backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-compatible HTTP endpoint
    Http,
    /// Deterministic hash vectors, for offline runs and tests
    #[default]
    Hash,
}

/// Embedding configuration
///
/// ```toml
/// [embedding]
/// backend = "http"
/// endpoint = "https://api.openai.com/v1/embeddings"
/// model = "text-embedding-3-small"
/// dimensions = 1536
/// # api_key from OPENAI_API_KEY env var
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// HTTP backend: API endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// HTTP backend: API key (optional, can also use OPENAI_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name sent with each request and reported in statistics
    #[serde(default = "default_model")]
    pub model: String,
    /// Embedding dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// HTTP backend: request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Chunks per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between consecutive batches of one document
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl EmbeddingConfig {
    /// Describe every problem with this configuration
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.dimensions == 0 {
            errors.push("embedding dimensions must be positive".to_string());
        }
        if self.dimensions > 4096 {
            errors.push("embedding dimensions must be <= 4096".to_string());
        }
        if self.batch_size == 0 {
            errors.push("embedding batch_size must be positive".to_string());
        }
        if self.backend == BackendKind::Http
            && self.endpoint.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            errors.push("http embedding backend requires an endpoint".to_string());
        }
        errors
    }
}
