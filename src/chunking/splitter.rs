//! Page-local splitting of normalized text into overlapping chunks

use crate::config::ChunkingConfig;
use crate::types::{Chunk, PageText};
use anyhow::Result;
use tracing::debug;

/// How far back from a tentative window end to look for a sentence break.
///
/// Fixed in characters and independent of `chunk_overlap`.
pub const SENTENCE_LOOKBACK: usize = 200;

/// Text splitter for creating page-local, overlapping chunks
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: ChunkingConfig,
}

impl TextSplitter {
    /// Create a new text splitter, rejecting invalid size/overlap combinations
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        let errors = config.validation_errors();
        if !errors.is_empty() {
            anyhow::bail!("Invalid chunking configuration: {}", errors.join("; "));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split an ordered sequence of pages into chunks.
    ///
    /// `chunk_index` runs across the whole document; pages never share a chunk.
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_idx = 0;

        for page in pages {
            let page_chunks = self.split_page(page, chunk_idx);
            chunk_idx += page_chunks.len();
            chunks.extend(page_chunks);
        }

        debug!(
            "Split {} pages into {} chunks (size={}, overlap={})",
            pages.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        chunks
    }

    /// Split a single page, numbering its chunks from `first_index`
    pub fn split_page(&self, page: &PageText, first_index: usize) -> Vec<Chunk> {
        let chars: Vec<char> = page.text.chars().collect();

        if chars.len() <= self.config.chunk_size {
            let text = page.text.trim();
            if text.is_empty() {
                return Vec::new();
            }
            return vec![Chunk::new(text.to_string(), first_index, page.page_number)];
        }

        let mut chunks = Vec::new();
        for (start, end) in self.window_bounds(&chars) {
            let window: String = chars[start..end].iter().collect();
            let text = window.trim();
            if text.is_empty() {
                continue;
            }
            chunks.push(Chunk::new(
                text.to_string(),
                first_index + chunks.len(),
                page.page_number,
            ));
        }

        chunks
    }

    /// Compute `[start, end)` character windows covering `chars`
    fn window_bounds(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let len = chars.len();
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut bounds = Vec::new();
        let mut start = 0;

        while start < len {
            let tentative = start + size;
            let end = if tentative < len {
                find_sentence_end(chars, start, tentative).unwrap_or(tentative)
            } else {
                len
            };

            bounds.push((start, end));

            // The tail has been emitted; stepping back by the overlap would
            // only repeat a suffix of it.
            if end >= len {
                break;
            }

            let next = end.saturating_sub(overlap);
            start = if next <= start { end } else { next };
        }

        bounds
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

/// Find the position just past the last `.` in the lookback window before `end`.
///
/// Only periods strictly after `start` count, so a window never collapses to
/// nothing.
fn find_sentence_end(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let search_start = end.saturating_sub(SENTENCE_LOOKBACK).max(start);
    chars[search_start..end]
        .iter()
        .rposition(|&c| c == '.')
        .map(|offset| search_start + offset)
        .filter(|&pos| pos > start)
        .map(|pos| pos + 1)
}
