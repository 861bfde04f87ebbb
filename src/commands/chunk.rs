use super::OutputFormat;
use anyhow::{Context, Result};
use pdfchunk::{
    chunking::TextSplitter,
    config::{ChunkingConfig, Config},
    content::extract_from_path,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Serialize)]
struct ChunkOutput<'a> {
    source: String,
    pages: usize,
    chunking: &'a ChunkingConfig,
    chunks: &'a [pdfchunk::Chunk],
}

/// Extract and chunk a PDF, printing the chunks without persisting them
pub fn chunk_file(
    config: Config,
    path: PathBuf,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let mut chunking = config.chunking;
    if let Some(size) = chunk_size {
        chunking.chunk_size = size;
    }
    if let Some(overlap) = chunk_overlap {
        chunking.chunk_overlap = overlap;
    }
    let splitter = TextSplitter::new(chunking)?;

    let pages = extract_from_path(&path)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;
    let chunks = splitter.split_pages(&pages);
    info!(
        "Chunked {}: {} pages, {} chunks",
        path.display(),
        pages.len(),
        chunks.len()
    );

    match format {
        OutputFormat::Json => {
            let output = ChunkOutput {
                source: path.display().to_string(),
                pages: pages.len(),
                chunking: splitter.config(),
                chunks: &chunks,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!(
                "{}: {} pages, {} chunks",
                path.display(),
                pages.len(),
                chunks.len()
            );
            for chunk in &chunks {
                println!(
                    "\n--- chunk {} (page {}, {} chars) ---",
                    chunk.chunk_index, chunk.page_number, chunk.char_count
                );
                println!("{}", chunk.text);
            }
        }
    }

    Ok(())
}
