//! In-memory document store

use super::{apply_status, DocumentStore, StoreError, StoreResult};
use crate::types::{Chunk, DocumentId, DocumentRecord, DocumentStatus, Embedding, StoredChunk};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Document store that keeps everything in process memory.
///
/// Chunk vectors are kept sorted by `chunk_index`.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentId, DocumentRecord>>,
    chunks: RwLock<HashMap<DocumentId, Vec<StoredChunk>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn put_document(&self, record: &DocumentRecord) -> StoreResult<()> {
        self.documents
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>> {
        Ok(self.documents.read().get(document_id).cloned())
    }

    fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>> {
        let mut records: Vec<DocumentRecord> = self.documents.read().values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    fn mark_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        error: Option<String>,
    ) -> StoreResult<DocumentRecord> {
        let mut documents = self.documents.write();
        let record = documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        apply_status(record, status, error);
        Ok(record.clone())
    }

    fn save_chunks(&self, document_id: &str, chunks: &[Chunk]) -> StoreResult<usize> {
        let mut stored: Vec<StoredChunk> = chunks
            .iter()
            .map(|c| StoredChunk::new(document_id, c.clone()))
            .collect();
        stored.sort_by_key(|c| c.chunk.chunk_index);
        self.chunks.write().insert(document_id.to_string(), stored);
        Ok(chunks.len())
    }

    fn get_chunks_by_document(&self, document_id: &str) -> StoreResult<Vec<StoredChunk>> {
        Ok(self
            .chunks
            .read()
            .get(document_id)
            .cloned()
            .unwrap_or_default())
    }

    fn set_embeddings(
        &self,
        document_id: &str,
        embeddings: &[(usize, Embedding)],
    ) -> StoreResult<()> {
        let mut all_chunks = self.chunks.write();
        let empty = Vec::new();
        let existing = all_chunks.get(document_id).unwrap_or(&empty);

        // Resolve every position before writing so a bad index changes nothing
        let mut positions = Vec::with_capacity(embeddings.len());
        for (chunk_index, _) in embeddings {
            let pos = existing
                .binary_search_by_key(chunk_index, |c| c.chunk.chunk_index)
                .map_err(|_| StoreError::ChunkNotFound {
                    document_id: document_id.to_string(),
                    chunk_index: *chunk_index,
                })?;
            positions.push(pos);
        }

        if let Some(doc_chunks) = all_chunks.get_mut(document_id) {
            for (pos, (_, embedding)) in positions.into_iter().zip(embeddings) {
                doc_chunks[pos].embedding = Some(embedding.clone());
            }
        }
        Ok(())
    }

    fn delete_chunks(&self, document_id: &str) -> StoreResult<usize> {
        Ok(self
            .chunks
            .write()
            .remove(document_id)
            .map_or(0, |c| c.len()))
    }

    fn delete_document(&self, document_id: &str) -> StoreResult<bool> {
        self.delete_chunks(document_id)?;
        Ok(self.documents.write().remove(document_id).is_some())
    }
}
