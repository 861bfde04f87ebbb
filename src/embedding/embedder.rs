//! Batched embedding of stored chunks

use super::backend::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::config::EmbeddingConfig;
use crate::store::{DocumentStore, StoreError};
use crate::types::{round_percentage, DocumentId, EmbeddingStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Per-document results of [`ChunkEmbedder::embed_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedAllReport {
    /// Documents embedded, with the number of chunks embedded in each
    pub succeeded: Vec<(DocumentId, usize)>,
    /// Documents that failed, with the error message
    pub failed: Vec<(DocumentId, String)>,
}

impl EmbedAllReport {
    pub fn total_chunks(&self) -> usize {
        self.succeeded.iter().map(|(_, n)| n).sum()
    }
}

/// Attaches embeddings to stored chunks that lack one
pub struct ChunkEmbedder {
    store: Arc<dyn DocumentStore>,
    backend: Arc<dyn EmbeddingBackend>,
    model: String,
    batch_size: usize,
    batch_delay: Duration,
}

impl ChunkEmbedder {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn EmbeddingBackend>,
        config: &EmbeddingConfig,
    ) -> Self {
        Self {
            store,
            backend,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }

    /// Embed every chunk of a document that has no embedding yet.
    ///
    /// Returns the number of chunks embedded. Batches already written stay
    /// written if a later batch fails.
    pub fn embed_document(&self, document_id: &str) -> EmbeddingResult<usize> {
        if self.store.get_document(document_id)?.is_none() {
            return Err(StoreError::DocumentNotFound(document_id.to_string()).into());
        }

        let pending: Vec<_> = self
            .store
            .get_chunks_by_document(document_id)?
            .into_iter()
            .filter(|c| !c.has_embedding())
            .collect();

        if pending.is_empty() {
            info!("No chunks need embeddings for document {}", document_id);
            return Ok(0);
        }

        let total_batches = pending.len().div_ceil(self.batch_size);
        info!(
            "Embedding {} chunks for document {} in {} batches",
            pending.len(),
            document_id,
            total_batches
        );

        for (i, batch) in pending.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.chunk.text.clone()).collect();
            let vectors = self.backend.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::EmbeddingFailed(format!(
                    "expected {} embeddings, backend returned {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            let updates: Vec<(usize, Vec<f32>)> = batch
                .iter()
                .map(|c| c.chunk.chunk_index)
                .zip(vectors)
                .collect();
            self.store.set_embeddings(document_id, &updates)?;
            info!(
                "Embedded batch {}/{} for document {}",
                i + 1,
                total_batches,
                document_id
            );

            if i + 1 < total_batches && !self.batch_delay.is_zero() {
                std::thread::sleep(self.batch_delay);
            }
        }

        Ok(pending.len())
    }

    /// Embed every document that still has chunks without embeddings
    pub fn embed_all(&self) -> EmbeddingResult<EmbedAllReport> {
        let mut report = EmbedAllReport::default();

        for document in self.store.list_documents()? {
            let chunks = self.store.get_chunks_by_document(&document.id)?;
            if !chunks.iter().any(|c| !c.has_embedding()) {
                debug!("Skipping document {}: nothing to embed", document.id);
                continue;
            }

            match self.embed_document(&document.id) {
                Ok(count) => report.succeeded.push((document.id, count)),
                Err(e) => {
                    error!("Embedding document {} failed: {}", document.id, e);
                    report.failed.push((document.id, e.to_string()));
                }
            }
        }

        info!(
            "Embedded {} chunks across {} documents ({} failed)",
            report.total_chunks(),
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Embedding coverage across the whole store
    pub fn stats(&self) -> EmbeddingResult<EmbeddingStats> {
        let mut total_chunks = 0;
        let mut embedded_chunks = 0;
        let mut documents_with_embeddings = 0;
        let mut total_documents_with_chunks = 0;

        for document in self.store.list_documents()? {
            let chunks = self.store.get_chunks_by_document(&document.id)?;
            if chunks.is_empty() {
                continue;
            }
            let embedded = chunks.iter().filter(|c| c.has_embedding()).count();

            total_documents_with_chunks += 1;
            if embedded > 0 {
                documents_with_embeddings += 1;
            }
            total_chunks += chunks.len();
            embedded_chunks += embedded;
        }

        Ok(EmbeddingStats {
            total_chunks,
            embedded_chunks,
            chunks_without_embeddings: total_chunks - embedded_chunks,
            embedding_coverage: round_percentage(embedded_chunks, total_chunks),
            documents_with_embeddings,
            total_documents_with_chunks,
            embedding_model: self.model.clone(),
            embedding_dimension: self.backend.dimensions(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashBackend;
    use crate::store::MemoryStore;
    use crate::types::{Chunk, DocumentRecord, Embedding};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and optionally drops a vector from every batch
    #[derive(Debug, Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        short: bool,
    }

    impl EmbeddingBackend for CountingBackend {
        fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut vectors: Vec<Embedding> =
                texts.iter().map(|t| self.embed(t)).collect::<Result<_, _>>()?;
            if self.short {
                vectors.pop();
            }
            Ok(vectors)
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn config(batch_size: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            batch_size,
            batch_delay_ms: 0,
            ..EmbeddingConfig::default()
        }
    }

    fn store_with_document(chunk_count: usize) -> (Arc<dyn DocumentStore>, String) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let record = DocumentRecord::new("doc.pdf", b"%PDF-");
        store.put_document(&record).unwrap();
        let chunks: Vec<Chunk> = (0..chunk_count)
            .map(|i| Chunk::new(format!("chunk number {}", i), i, 1))
            .collect();
        store.save_chunks(&record.id, &chunks).unwrap();
        (store, record.id)
    }

    #[test]
    fn test_embed_document_in_batches() {
        let (store, id) = store_with_document(5);
        let backend = Arc::new(CountingBackend::default());
        let embedder = ChunkEmbedder::new(store.clone(), backend.clone(), &config(2));

        assert_eq!(embedder.embed_document(&id).unwrap(), 5);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert!(store
            .get_chunks_by_document(&id)
            .unwrap()
            .iter()
            .all(|c| c.has_embedding()));
    }

    #[test]
    fn test_embed_document_skips_embedded_chunks() {
        let (store, id) = store_with_document(3);
        store.set_embeddings(&id, &[(0, vec![0.5, 0.5])]).unwrap();

        let backend = Arc::new(CountingBackend::default());
        let embedder = ChunkEmbedder::new(store.clone(), backend, &config(10));
        assert_eq!(embedder.embed_document(&id).unwrap(), 2);

        let chunks = store.get_chunks_by_document(&id).unwrap();
        assert_eq!(chunks[0].embedding, Some(vec![0.5, 0.5]));

        assert_eq!(embedder.embed_document(&id).unwrap(), 0);
    }

    #[test]
    fn test_embed_document_unknown_id() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let embedder = ChunkEmbedder::new(store, Arc::new(HashBackend::new(4)), &config(2));
        let err = embedder.embed_document("missing").unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::Store(StoreError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_embed_document_rejects_vector_count_mismatch() {
        let (store, id) = store_with_document(2);
        let backend = Arc::new(CountingBackend {
            short: true,
            ..CountingBackend::default()
        });
        let embedder = ChunkEmbedder::new(store.clone(), backend, &config(10));

        let err = embedder.embed_document(&id).unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings"));
        assert!(store
            .get_chunks_by_document(&id)
            .unwrap()
            .iter()
            .all(|c| !c.has_embedding()));
    }

    #[test]
    fn test_embed_all_and_stats() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for (name, count) in [("a.pdf", 2usize), ("b.pdf", 3), ("empty.pdf", 0)] {
            let record = DocumentRecord::new(name, name.as_bytes());
            store.put_document(&record).unwrap();
            let chunks: Vec<Chunk> = (0..count)
                .map(|i| Chunk::new(format!("{} {}", name, i), i, 1))
                .collect();
            store.save_chunks(&record.id, &chunks).unwrap();
            ids.push(record.id);
        }

        let embedder = ChunkEmbedder::new(store, Arc::new(HashBackend::new(8)), &config(2));

        let before = embedder.stats().unwrap();
        assert_eq!(before.total_chunks, 5);
        assert_eq!(before.embedded_chunks, 0);
        assert_eq!(before.embedding_coverage, 0.0);
        assert_eq!(before.total_documents_with_chunks, 2);
        assert_eq!(before.embedding_dimension, 8);
        assert_eq!(before.embedding_model, "text-embedding-3-small");

        embedder.embed_document(&ids[0]).unwrap();
        let partial = embedder.stats().unwrap();
        assert_eq!(partial.embedded_chunks, 2);
        assert_eq!(partial.chunks_without_embeddings, 3);
        assert_eq!(partial.embedding_coverage, 40.0);
        assert_eq!(partial.documents_with_embeddings, 1);

        let report = embedder.embed_all().unwrap();
        assert_eq!(report.succeeded, vec![(ids[1].clone(), 3)]);
        assert!(report.failed.is_empty());

        let after = embedder.stats().unwrap();
        assert_eq!(after.embedding_coverage, 100.0);
        assert_eq!(after.documents_with_embeddings, 2);
    }

    #[test]
    fn test_stats_on_empty_store() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let embedder = ChunkEmbedder::new(store, Arc::new(HashBackend::new(4)), &config(2));
        let stats = embedder.stats().unwrap();
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.embedding_coverage, 0.0);
    }
}
