//! Persistence for documents and their chunks
//!
//! The [`DocumentStore`] trait is what the processor and embedder depend on.
//! [`SledStore`] persists to disk; [`MemoryStore`] keeps everything in
//! process memory.

mod disk;
mod memory;

pub use disk::SledStore;
pub use memory::MemoryStore;

use crate::types::{Chunk, DocumentId, DocumentRecord, DocumentStatus, Embedding, StoredChunk};

/// Errors raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Chunk {chunk_index} not found for document {document_id}")]
    ChunkNotFound {
        document_id: DocumentId,
        chunk_index: usize,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage collaborator for documents, their status, and their chunks
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a document record
    fn put_document(&self, record: &DocumentRecord) -> StoreResult<()>;

    fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>>;

    /// All documents, oldest first
    fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>>;

    /// Set a document's status, recording `error` for failures.
    ///
    /// Returns the updated record.
    fn mark_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        error: Option<String>,
    ) -> StoreResult<DocumentRecord>;

    /// Replace all chunks of a document in one atomic write
    fn save_chunks(&self, document_id: &str, chunks: &[Chunk]) -> StoreResult<usize>;

    /// Chunks of a document ordered by `chunk_index`
    fn get_chunks_by_document(&self, document_id: &str) -> StoreResult<Vec<StoredChunk>>;

    /// Attach embeddings to chunks identified by `chunk_index`
    fn set_embeddings(
        &self,
        document_id: &str,
        embeddings: &[(usize, Embedding)],
    ) -> StoreResult<()>;

    /// Remove all chunks of a document, returning how many were removed
    fn delete_chunks(&self, document_id: &str) -> StoreResult<usize>;

    /// Remove a document and its chunks; false if it did not exist
    fn delete_document(&self, document_id: &str) -> StoreResult<bool>;
}

/// Apply a status change to a record in place
pub(crate) fn apply_status(
    record: &mut DocumentRecord,
    status: DocumentStatus,
    error: Option<String>,
) {
    record.status = status;
    record.error = error;
    record.updated_at = chrono::Utc::now();
}
