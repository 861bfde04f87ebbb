//! Backend factory for creating embedding backends from configuration

use super::hash::HashBackend;
use super::http::{HttpBackend, HttpConfig};
use super::traits::{EmbeddingBackend, EmbeddingResult};
use crate::config::{BackendKind, EmbeddingConfig};
use std::sync::Arc;
use tracing::info;

/// Create an embedding backend from configuration
///
/// Returns an `Arc<dyn EmbeddingBackend>` that can be shared across threads.
pub fn create_backend(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    match config.backend {
        BackendKind::Http => {
            let http_config = HttpConfig::from_embedding_config(config)?;
            info!(
                "Creating HTTP embedding backend: endpoint={}",
                http_config.endpoint
            );
            Ok(Arc::new(HttpBackend::new(http_config)?))
        }
        BackendKind::Hash => {
            info!(
                "Creating hash embedding backend ({} dimensions); vectors carry no meaning",
                config.dimensions
            );
            Ok(Arc::new(HashBackend::new(config.dimensions)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingError;

    #[test]
    fn test_create_http_backend() {
        let config = EmbeddingConfig {
            backend: BackendKind::Http,
            endpoint: Some("http://localhost:8080/v1/embeddings".to_string()),
            model: "test-model".to_string(),
            dimensions: 384,
            ..EmbeddingConfig::default()
        };

        // Only builds the client; no request is made
        let backend = create_backend(&config).unwrap();
        assert_eq!(backend.name(), "http");
        assert_eq!(backend.dimensions(), 384);
    }

    #[test]
    fn test_create_http_backend_without_endpoint_fails() {
        let config = EmbeddingConfig {
            backend: BackendKind::Http,
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            create_backend(&config),
            Err(EmbeddingError::Config(_))
        ));
    }

    #[test]
    fn test_create_hash_backend() {
        let config = EmbeddingConfig {
            dimensions: 64,
            ..EmbeddingConfig::default()
        };
        let backend = create_backend(&config).unwrap();
        assert_eq!(backend.name(), "hash");
        assert_eq!(backend.embed("text").unwrap().len(), 64);
    }
}
