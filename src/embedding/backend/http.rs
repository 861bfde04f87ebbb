//! HTTP embedding backend for OpenAI-compatible APIs
//!
//! Works with the OpenAI API itself and with local servers that expose the
//! same `/v1/embeddings` contract (LM Studio, vLLM, Ollama,
//! text-embeddings-inference).

use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use super::normalize_embedding;
use crate::config::EmbeddingConfig;
use crate::types::Embedding;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection settings for the HTTP backend
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API endpoint (e.g., "https://api.openai.com/v1/embeddings")
    pub endpoint: String,
    /// API key; falls back to the OPENAI_API_KEY env var
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
    /// Most texts sent in one request
    pub max_batch_size: usize,
}

impl HttpConfig {
    /// Build from the `[embedding]` config section
    pub fn from_embedding_config(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                EmbeddingError::Config("http embedding backend requires an endpoint".to_string())
            })?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            timeout_secs: config.timeout_secs,
            max_batch_size: config.batch_size.max(1),
        })
    }
}

/// HTTP embedding backend for OpenAI-compatible APIs
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    config: HttpConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HttpBackend {
    pub fn new(config: HttpConfig) -> EmbeddingResult<Self> {
        info!(
            "Initializing HTTP embedding backend: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());

        match &api_key {
            Some(key) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                    EmbeddingError::Config(format!("Invalid API key format: {}", e))
                })?;
                headers.insert(AUTHORIZATION, value);
            }
            None if config.endpoint.contains("openai.com") => {
                warn!("No API key provided for {}", config.endpoint);
            }
            None => {}
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn request_embeddings(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            // Only text-embedding-3-* models accept a dimensions override
            dimensions: self
                .config
                .model
                .contains("text-embedding-3")
                .then_some(self.config.dimensions),
            encoding_format: "float",
        };

        debug!(
            "Sending embedding request to {} for {} texts",
            self.config.endpoint,
            texts.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000);
            return Err(EmbeddingError::RateLimited { retry_after_ms });
        }

        let body = response.text()?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        parse_embedding_response(&body, texts.len())
    }
}

/// Turn a non-2xx response into an error carrying the API's message
fn api_error(status: StatusCode, body: &str) -> EmbeddingError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => EmbeddingError::EmbeddingFailed(format!(
            "API error ({}): {}",
            status, parsed.error.message
        )),
        Err(_) => EmbeddingError::EmbeddingFailed(format!("HTTP error ({}): {}", status, body)),
    }
}

/// Parse a successful response body into normalized vectors in input order
fn parse_embedding_response(body: &str, expected: usize) -> EmbeddingResult<Vec<Embedding>> {
    let response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Failed to parse response: {}", e)))?;

    if let Some(usage) = &response.usage {
        debug!("Embedding request used {} tokens", usage.total_tokens);
    }

    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbeddingError::EmbeddingFailed(format!(
            "expected {} embeddings, API returned {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);

    Ok(data
        .into_iter()
        .map(|d| normalize_embedding(d.embedding))
        .collect())
}

impl EmbeddingBackend for HttpBackend {
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        self.request_embeddings(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding returned".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let text_refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in text_refs.chunks(self.config.max_batch_size) {
            all_embeddings.extend(self.request_embeddings(batch)?);
        }
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    fn http_embedding_config() -> EmbeddingConfig {
        EmbeddingConfig {
            backend: BackendKind::Http,
            endpoint: Some("http://localhost:1234/v1/embeddings".to_string()),
            dimensions: 3,
            batch_size: 8,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn test_http_config_from_embedding_config() {
        let config = HttpConfig::from_embedding_config(&http_embedding_config()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:1234/v1/embeddings");
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 3);
        assert_eq!(config.max_batch_size, 8);
    }

    #[test]
    fn test_http_config_requires_endpoint() {
        let mut embedding = http_embedding_config();
        embedding.endpoint = Some("  ".to_string());
        let err = HttpConfig::from_embedding_config(&embedding).unwrap_err();
        assert!(matches!(err, EmbeddingError::Config(_)));
    }

    #[test]
    fn test_parse_response_sorts_by_index_and_normalizes() {
        let body = r#"{
            "data": [
                {"embedding": [0.0, 2.0], "index": 1},
                {"embedding": [3.0, 4.0], "index": 0}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;
        let vectors = parse_embedding_response(body, 2).unwrap();
        assert!((vectors[0][0] - 0.6).abs() < 1e-6);
        assert!((vectors[0][1] - 0.8).abs() < 1e-6);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_response_rejects_count_mismatch() {
        let body = r#"{"data": [{"embedding": [1.0], "index": 0}]}"#;
        let err = parse_embedding_response(body, 2).unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings"));
    }

    #[test]
    fn test_api_error_uses_api_message() {
        let body = r#"{"error": {"message": "Invalid model", "type": "invalid_request_error"}}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Invalid model"));

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_backend_reports_configuration() {
        let config = HttpConfig::from_embedding_config(&http_embedding_config()).unwrap();
        let backend = HttpBackend::new(config).unwrap();
        assert_eq!(backend.name(), "http");
        assert_eq!(backend.dimensions(), 3);
    }
}
