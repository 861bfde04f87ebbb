//! Storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "pdfchunk")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".pdfchunk"))
}

/// 10 MiB
fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the document database and uploaded files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Largest accepted upload in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl StorageConfig {
    /// Directory uploaded PDFs are copied into
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}
