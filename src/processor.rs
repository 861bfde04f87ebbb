//! Document lifecycle orchestration
//!
//! A document moves `uploaded -> processing -> completed | failed`. Each
//! processing attempt ends in exactly one terminal status, and chunks are
//! persisted in a single `save_chunks` call only when the whole pipeline
//! succeeded.

use crate::chunking::TextSplitter;
use crate::config::{ChunkingConfig, Config, StorageConfig};
use crate::content::{extract_from_bytes, validate_pdf, ExtractionError};
use crate::store::{DocumentStore, StoreError};
use crate::types::{DocumentRecord, DocumentStats, DocumentStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Errors raised by the document lifecycle
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Extraction and chunking produced nothing to store
    #[error("No content extracted: {0}")]
    EmptyResult(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document {0} is already being processed")]
    InProgress(String),

    #[error("Document {id} has status '{status}' and cannot be {action}")]
    InvalidStatus {
        id: String,
        status: DocumentStatus,
        action: &'static str,
    },

    #[error("Uploaded file for document {id} is missing: {path}")]
    FileMissing { id: String, path: String },

    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result of a `process` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The document was processed in this call
    Completed(DocumentStats),
    /// The document had already been processed; nothing was done
    AlreadyCompleted(DocumentStats),
}

impl ProcessOutcome {
    pub fn stats(&self) -> &DocumentStats {
        match self {
            Self::Completed(stats) | Self::AlreadyCompleted(stats) => stats,
        }
    }
}

/// Registers uploads and drives documents through extraction and chunking
pub struct DocumentProcessor {
    store: Arc<dyn DocumentStore>,
    splitter: TextSplitter,
    storage: StorageConfig,
}

impl DocumentProcessor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        chunking: ChunkingConfig,
        storage: StorageConfig,
    ) -> Result<Self, ProcessingError> {
        let splitter =
            TextSplitter::new(chunking).map_err(|e| ProcessingError::Config(e.to_string()))?;
        Ok(Self {
            store,
            splitter,
            storage,
        })
    }

    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: &Config,
    ) -> Result<Self, ProcessingError> {
        Self::new(store, config.chunking.clone(), config.storage.clone())
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Register a PDF from disk, copying it into the uploads directory
    pub fn register_path(&self, path: &Path) -> Result<DocumentRecord, ProcessingError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if let Ok(meta) = std::fs::metadata(path) {
            self.check_size(meta.len())?;
        }
        let bytes = std::fs::read(path).map_err(|source| ProcessingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.register_bytes(&filename, &bytes)
    }

    /// Register an uploaded PDF given its original filename and bytes
    pub fn register_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<DocumentRecord, ProcessingError> {
        self.check_size(bytes.len() as u64)?;
        validate_pdf(Path::new(filename), bytes)?;

        let uploads_dir = self.storage.uploads_dir();
        std::fs::create_dir_all(&uploads_dir).map_err(|source| ProcessingError::Io {
            path: uploads_dir.display().to_string(),
            source,
        })?;

        let record = DocumentRecord::new(filename, bytes);
        let upload_path = uploads_dir.join(format!("{}.pdf", record.id));
        std::fs::write(&upload_path, bytes).map_err(|source| ProcessingError::Io {
            path: upload_path.display().to_string(),
            source,
        })?;
        let record = record.with_upload_path(upload_path.clone());

        if let Err(e) = self.store.put_document(&record) {
            if let Err(remove_err) = std::fs::remove_file(&upload_path) {
                warn!(
                    "Failed to remove upload {} after store error: {}",
                    upload_path.display(),
                    remove_err
                );
            }
            return Err(e.into());
        }
        info!(
            "Registered document {} ({}, {} bytes)",
            record.id, record.filename, record.file_size
        );
        Ok(record)
    }

    fn check_size(&self, size: u64) -> Result<(), ProcessingError> {
        if size > self.storage.max_file_size {
            return Err(ProcessingError::TooLarge {
                size,
                max: self.storage.max_file_size,
            });
        }
        Ok(())
    }

    fn require_document(&self, document_id: &str) -> Result<DocumentRecord, ProcessingError> {
        self.store
            .get_document(document_id)?
            .ok_or_else(|| ProcessingError::NotFound(document_id.to_string()))
    }

    /// Extract, chunk, and persist a document
    pub fn process(&self, document_id: &str) -> Result<ProcessOutcome, ProcessingError> {
        let record = self.require_document(document_id)?;

        match record.status {
            DocumentStatus::Completed => {
                info!("Document {} already processed", document_id);
                return Ok(ProcessOutcome::AlreadyCompleted(
                    self.stats_for(&record)?,
                ));
            }
            DocumentStatus::Processing => {
                warn!("Document {} is already being processed", document_id);
                return Err(ProcessingError::InProgress(document_id.to_string()));
            }
            DocumentStatus::Failed => {
                warn!(
                    "Document {} previously failed; reset it before reprocessing",
                    document_id
                );
                return Err(ProcessingError::InvalidStatus {
                    id: document_id.to_string(),
                    status: record.status,
                    action: "processed",
                });
            }
            DocumentStatus::Uploaded => {}
        }

        self.store
            .mark_status(document_id, DocumentStatus::Processing, None)?;
        info!("Processing document {} ({})", document_id, record.filename);

        match self.run_pipeline(&record) {
            Ok(completed) => {
                let stats = self.stats_for(&completed)?;
                info!(
                    "Completed document {}: {} chunks from {} pages",
                    document_id, stats.total_chunks, stats.pages
                );
                Ok(ProcessOutcome::Completed(stats))
            }
            Err(e) => {
                error!("Processing document {} failed: {}", document_id, e);
                self.record_failure(document_id, &e);
                Err(e)
            }
        }
    }

    /// Everything after the `processing` transition, ending in `completed`
    fn run_pipeline(&self, record: &DocumentRecord) -> Result<DocumentRecord, ProcessingError> {
        let path = record
            .upload_path
            .as_deref()
            .filter(|p| p.exists())
            .ok_or_else(|| ProcessingError::FileMissing {
                id: record.id.clone(),
                path: record
                    .upload_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<none>".to_string()),
            })?;

        let bytes = std::fs::read(path).map_err(|source| ProcessingError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let pages = extract_from_bytes(&bytes)?;
        if pages.is_empty() {
            return Err(ProcessingError::EmptyResult(
                "no text could be extracted from the PDF".to_string(),
            ));
        }
        debug!("Extracted {} pages from {}", pages.len(), record.id);

        let chunks = self.splitter.split_pages(&pages);
        if chunks.is_empty() {
            return Err(ProcessingError::EmptyResult(
                "no chunks were produced".to_string(),
            ));
        }

        self.store.save_chunks(&record.id, &chunks)?;
        let completed = self
            .store
            .mark_status(&record.id, DocumentStatus::Completed, None)?;
        Ok(completed)
    }

    fn record_failure(&self, document_id: &str, cause: &ProcessingError) {
        if let Err(e) = self.store.delete_chunks(document_id) {
            error!("Failed to clear chunks of {}: {}", document_id, e);
        }
        if let Err(e) =
            self.store
                .mark_status(document_id, DocumentStatus::Failed, Some(cause.to_string()))
        {
            error!("Failed to mark document {} as failed: {}", document_id, e);
        }
    }

    fn stats_for(&self, record: &DocumentRecord) -> Result<DocumentStats, ProcessingError> {
        let chunks = self.store.get_chunks_by_document(&record.id)?;
        Ok(DocumentStats::compute(record, &chunks))
    }

    /// Statistics for a document and its stored chunks
    pub fn stats(&self, document_id: &str) -> Result<DocumentStats, ProcessingError> {
        let record = self.require_document(document_id)?;
        self.stats_for(&record)
    }

    /// Remove a document, its chunks, and its uploaded file
    pub fn delete(&self, document_id: &str) -> Result<DocumentRecord, ProcessingError> {
        let record = self.require_document(document_id)?;
        self.store.delete_document(document_id)?;

        if let Some(path) = record.upload_path.as_deref().filter(|p| p.exists()) {
            if let Err(e) = std::fs::remove_file(path) {
                warn!("Failed to remove uploaded file {:?}: {}", path, e);
            }
        }
        info!("Deleted document {} ({})", document_id, record.filename);
        Ok(record)
    }

    /// Move a failed (or interrupted) document back to `uploaded`.
    ///
    /// Any chunks left from earlier attempts are removed.
    pub fn reset(&self, document_id: &str) -> Result<DocumentRecord, ProcessingError> {
        let record = self.require_document(document_id)?;
        match record.status {
            DocumentStatus::Failed | DocumentStatus::Processing => {}
            status => {
                return Err(ProcessingError::InvalidStatus {
                    id: document_id.to_string(),
                    status,
                    action: "reset",
                })
            }
        }

        let removed = self.store.delete_chunks(document_id)?;
        let record = self
            .store
            .mark_status(document_id, DocumentStatus::Uploaded, None)?;
        info!(
            "Reset document {} to uploaded ({} stale chunks removed)",
            document_id, removed
        );
        Ok(record)
    }

    /// Location an upload for `document_id` would be stored at
    pub fn upload_path_for(&self, document_id: &str) -> PathBuf {
        self.storage.uploads_dir().join(format!("{}.pdf", document_id))
    }
}
