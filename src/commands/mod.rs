//! CLI command implementations

pub mod chunk;
pub mod documents;
pub mod embed;
pub mod init;

use anyhow::{Context, Result};
use pdfchunk::config::Config;
use pdfchunk::embedding::{create_backend, ChunkEmbedder};
use pdfchunk::processor::DocumentProcessor;
use pdfchunk::store::{DocumentStore, SledStore};
use std::sync::Arc;

/// How commands print results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Opened data directory shared by the document commands
pub struct Workspace {
    pub config: Config,
    sled: Arc<SledStore>,
}

impl Workspace {
    pub fn open(config: Config) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let sled = SledStore::open(data_dir)
            .with_context(|| format!("Failed to open document store in {}", data_dir.display()))?;
        Ok(Self {
            config,
            sled: Arc::new(sled),
        })
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.sled.clone()
    }

    pub fn processor(&self) -> Result<DocumentProcessor> {
        DocumentProcessor::from_config(self.store(), &self.config)
            .context("Failed to create document processor")
    }

    pub fn embedder(&self) -> Result<ChunkEmbedder> {
        let backend =
            create_backend(&self.config.embedding).context("Failed to create embedding backend")?;
        Ok(ChunkEmbedder::new(
            self.store(),
            backend,
            &self.config.embedding,
        ))
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.sled.flush().context("Failed to flush document store")
    }
}
