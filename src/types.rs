//! Core types for the pdfchunk pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Unique identifier for a document
pub type DocumentId = String;

/// Embedding vector type
pub type Embedding = Vec<f32>;

// ============================================================================
// Extraction / chunking output
// ============================================================================

/// Normalized text of a single PDF page
///
/// `page_number` is the original 1-indexed page number in the source PDF,
/// so sequences of `PageText` may have gaps where empty pages were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub text: String,
    pub page_number: u32,
}

impl PageText {
    pub fn new(text: impl Into<String>, page_number: u32) -> Self {
        Self {
            text: text.into(),
            page_number,
        }
    }
}

/// A page-local span of normalized document text used as a retrieval unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed, non-empty chunk text
    pub text: String,
    /// Position of this chunk within its document (0-based, contiguous)
    pub chunk_index: usize,
    /// Page the chunk was taken from
    pub page_number: u32,
    /// Number of characters in `text`
    pub char_count: usize,
}

impl Chunk {
    /// Create a chunk, computing `char_count` from the text
    pub fn new(text: String, chunk_index: usize, page_number: u32) -> Self {
        let char_count = text.chars().count();
        Self {
            text,
            chunk_index,
            page_number,
            char_count,
        }
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// Document processing lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Exact content hash using SHA256 (64-character hex string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA256 hash of raw bytes
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentHash(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uploaded document metadata and processing status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub filename: String,
    pub file_size: u64,
    pub content_hash: ContentHash,
    /// Location of the uploaded bytes
    pub upload_path: Option<std::path::PathBuf>,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Failure message of the last processing attempt
    pub error: Option<String>,
}

impl DocumentRecord {
    /// Create a freshly uploaded document record
    pub fn new(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            file_size: bytes.len() as u64,
            content_hash: ContentHash::compute(bytes),
            upload_path: None,
            status: DocumentStatus::Uploaded,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    pub fn with_upload_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.upload_path = Some(path.into());
        self
    }
}

/// A chunk as persisted, with its owning document and optional embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub document_id: DocumentId,
    pub chunk: Chunk,
    pub embedding: Option<Embedding>,
}

impl StoredChunk {
    pub fn new(document_id: impl Into<DocumentId>, chunk: Chunk) -> Self {
        Self {
            document_id: document_id.into(),
            chunk,
            embedding: None,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-document processing statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub document_id: DocumentId,
    pub filename: String,
    pub status: DocumentStatus,
    pub total_chunks: usize,
    pub total_characters: usize,
    /// Highest page number that produced a chunk
    pub pages: u32,
    pub avg_chunk_size: usize,
}

impl DocumentStats {
    /// Compute statistics from a document and its chunks
    pub fn compute(document: &DocumentRecord, chunks: &[StoredChunk]) -> Self {
        let total_chunks = chunks.len();
        let total_characters: usize = chunks.iter().map(|c| c.chunk.char_count).sum();
        let pages = chunks
            .iter()
            .map(|c| c.chunk.page_number)
            .max()
            .unwrap_or(0);
        let avg_chunk_size = if total_chunks > 0 {
            total_characters / total_chunks
        } else {
            0
        };

        Self {
            document_id: document.id.clone(),
            filename: document.filename.clone(),
            status: document.status,
            total_chunks,
            total_characters,
            pages,
            avg_chunk_size,
        }
    }
}

/// Store-wide embedding coverage statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingStats {
    pub total_chunks: usize,
    pub embedded_chunks: usize,
    pub chunks_without_embeddings: usize,
    /// Percentage of chunks with an embedding, rounded to two decimals
    pub embedding_coverage: f64,
    pub documents_with_embeddings: usize,
    pub total_documents_with_chunks: usize,
    pub embedding_model: String,
    pub embedding_dimension: usize,
}

/// Round a percentage to two decimal places
pub(crate) fn round_percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let pct = numerator as f64 / denominator as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_char_count_counts_characters_not_bytes() {
        let chunk = Chunk::new("naïve café".to_string(), 0, 1);
        assert_eq!(chunk.char_count, 10);
        assert!(chunk.text.len() > chunk.char_count);
    }

    #[test]
    fn status_display_honors_width() {
        assert_eq!(DocumentStatus::Failed.to_string(), "failed");
        assert_eq!(format!("{:<10}|", DocumentStatus::Completed), "completed |");
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        let hash = ContentHash::compute(b"abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn document_stats_from_chunks() {
        let doc = DocumentRecord::new("paper.pdf", b"%PDF-1.5");
        let chunks = vec![
            StoredChunk::new(doc.id.clone(), Chunk::new("a".repeat(10), 0, 1)),
            StoredChunk::new(doc.id.clone(), Chunk::new("b".repeat(5), 1, 3)),
        ];
        let stats = DocumentStats::compute(&doc, &chunks);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_characters, 15);
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.avg_chunk_size, 7);
        assert_eq!(stats.status, DocumentStatus::Uploaded);
    }

    #[test]
    fn document_stats_without_chunks() {
        let doc = DocumentRecord::new("empty.pdf", b"");
        let stats = DocumentStats::compute(&doc, &[]);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.pages, 0);
        assert_eq!(stats.avg_chunk_size, 0);
    }

    #[test]
    fn percentage_rounding() {
        assert_eq!(round_percentage(1, 3), 33.33);
        assert_eq!(round_percentage(2, 3), 66.67);
        assert_eq!(round_percentage(0, 0), 0.0);
        assert_eq!(round_percentage(5, 5), 100.0);
    }
}
