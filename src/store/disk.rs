//! On-disk document store backed by sled
//!
//! Documents live in the `documents` tree keyed by id. Chunks live in the
//! `chunks` tree keyed by `{document_id}/{chunk_index as big-endian u64}`,
//! so a prefix scan yields a document's chunks in index order.

use super::{apply_status, DocumentStore, StoreError, StoreResult};
use crate::types::{Chunk, DocumentRecord, DocumentStatus, Embedding, StoredChunk};
use std::path::Path;
use tracing::{debug, warn};

const DOCUMENTS_TREE: &str = "documents";
const CHUNKS_TREE: &str = "chunks";

/// Document store using the sled embedded database
pub struct SledStore {
    db: sled::Db,
    documents: sled::Tree,
    chunks: sled::Tree,
}

fn chunk_prefix(document_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(document_id.len() + 1);
    key.extend_from_slice(document_id.as_bytes());
    key.push(b'/');
    key
}

fn chunk_key(document_id: &str, chunk_index: usize) -> Vec<u8> {
    let mut key = chunk_prefix(document_id);
    key.extend_from_slice(&(chunk_index as u64).to_be_bytes());
    key
}

impl SledStore {
    /// Open or create the database under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = data_dir.as_ref().join("documents.sled");
        let db = sled::open(&db_path)?;
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        let chunks = db.open_tree(CHUNKS_TREE)?;
        debug!("Opened document store at {:?}", db_path);
        Ok(Self {
            db,
            documents,
            chunks,
        })
    }

    /// Flush buffered writes to disk
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn chunk_keys(&self, document_id: &str) -> StoreResult<Vec<sled::IVec>> {
        let mut keys = Vec::new();
        for entry in self.chunks.scan_prefix(chunk_prefix(document_id)).keys() {
            keys.push(entry?);
        }
        Ok(keys)
    }
}

impl DocumentStore for SledStore {
    fn put_document(&self, record: &DocumentRecord) -> StoreResult<()> {
        let data = bincode::serialize(record)?;
        self.documents.insert(record.id.as_bytes(), data)?;
        Ok(())
    }

    fn get_document(&self, document_id: &str) -> StoreResult<Option<DocumentRecord>> {
        match self.documents.get(document_id.as_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    fn list_documents(&self) -> StoreResult<Vec<DocumentRecord>> {
        let mut records = Vec::new();
        for entry in self.documents.iter() {
            let (key, data) = entry?;
            match bincode::deserialize::<DocumentRecord>(&data) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Skipping unreadable document record {}: {}",
                    String::from_utf8_lossy(&key),
                    e
                ),
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    fn mark_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        error: Option<String>,
    ) -> StoreResult<DocumentRecord> {
        let mut record = self
            .get_document(document_id)?
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
        apply_status(&mut record, status, error);
        self.put_document(&record)?;
        Ok(record)
    }

    fn save_chunks(&self, document_id: &str, chunks: &[Chunk]) -> StoreResult<usize> {
        let mut batch = sled::Batch::default();
        for key in self.chunk_keys(document_id)? {
            batch.remove(key);
        }
        for chunk in chunks {
            let stored = StoredChunk::new(document_id, chunk.clone());
            let data = bincode::serialize(&stored)?;
            batch.insert(chunk_key(document_id, chunk.chunk_index), data);
        }
        self.chunks.apply_batch(batch)?;
        debug!("Saved {} chunks for document {}", chunks.len(), document_id);
        Ok(chunks.len())
    }

    fn get_chunks_by_document(&self, document_id: &str) -> StoreResult<Vec<StoredChunk>> {
        let mut chunks = Vec::new();
        for entry in self.chunks.scan_prefix(chunk_prefix(document_id)).values() {
            let data = entry?;
            chunks.push(bincode::deserialize(&data)?);
        }
        Ok(chunks)
    }

    fn set_embeddings(
        &self,
        document_id: &str,
        embeddings: &[(usize, Embedding)],
    ) -> StoreResult<()> {
        let mut batch = sled::Batch::default();
        for (chunk_index, embedding) in embeddings {
            let key = chunk_key(document_id, *chunk_index);
            let data = self
                .chunks
                .get(&key)?
                .ok_or_else(|| StoreError::ChunkNotFound {
                    document_id: document_id.to_string(),
                    chunk_index: *chunk_index,
                })?;
            let mut stored: StoredChunk = bincode::deserialize(&data)?;
            stored.embedding = Some(embedding.clone());
            batch.insert(key, bincode::serialize(&stored)?);
        }
        self.chunks.apply_batch(batch)?;
        Ok(())
    }

    fn delete_chunks(&self, document_id: &str) -> StoreResult<usize> {
        let keys = self.chunk_keys(document_id)?;
        let removed = keys.len();
        let mut batch = sled::Batch::default();
        for key in keys {
            batch.remove(key);
        }
        self.chunks.apply_batch(batch)?;
        Ok(removed)
    }

    fn delete_document(&self, document_id: &str) -> StoreResult<bool> {
        let removed_chunks = self.delete_chunks(document_id)?;
        let existed = self.documents.remove(document_id.as_bytes())?.is_some();
        if existed {
            debug!(
                "Deleted document {} with {} chunks",
                document_id, removed_chunks
            );
        }
        Ok(existed)
    }
}
