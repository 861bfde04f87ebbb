use super::Workspace;
use anyhow::{Context, Result};
use pdfchunk::{
    config::Config,
    processor::ProcessOutcome,
    types::DocumentStats,
    util::preview,
};
use std::path::PathBuf;

const PREVIEW_CHARS: usize = 200;

fn print_stats(stats: &DocumentStats) {
    println!("Document:          {}", stats.document_id);
    println!("Filename:          {}", stats.filename);
    println!("Status:            {}", stats.status);
    println!("Total chunks:      {}", stats.total_chunks);
    println!("Total characters:  {}", stats.total_characters);
    println!("Pages:             {}", stats.pages);
    println!("Avg chunk size:    {}", stats.avg_chunk_size);
}

fn print_outcome(outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Completed(_) => println!("Processing completed"),
        ProcessOutcome::AlreadyCompleted(_) => println!("Document was already processed"),
    }
    print_stats(outcome.stats());
}

pub fn upload(config: Config, path: PathBuf) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let record = workspace
        .processor()?
        .register_path(&path)
        .with_context(|| format!("Failed to upload {}", path.display()))?;
    workspace.flush()?;

    println!("{}", record.id);
    Ok(())
}

pub fn process(config: Config, id: String) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let result = workspace.processor()?.process(&id);
    // The failed status is persisted even when processing errors
    workspace.flush()?;

    let outcome = result.with_context(|| format!("Failed to process document {}", id))?;
    print_outcome(&outcome);
    Ok(())
}

pub fn ingest(config: Config, path: PathBuf) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let processor = workspace.processor()?;

    let record = processor
        .register_path(&path)
        .with_context(|| format!("Failed to upload {}", path.display()))?;
    println!("Uploaded {} as {}", record.filename, record.id);

    let result = processor.process(&record.id);
    workspace.flush()?;

    let outcome = result.with_context(|| format!("Failed to process document {}", record.id))?;
    print_outcome(&outcome);
    Ok(())
}

pub fn list(config: Config) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let documents = workspace.store().list_documents()?;

    if documents.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:>10}  {:<20}  FILENAME", "ID", "STATUS", "BYTES", "UPLOADED");
    for doc in &documents {
        println!(
            "{:<36}  {:<10}  {:>10}  {:<20}  {}",
            doc.id,
            doc.status,
            doc.file_size,
            doc.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            doc.filename
        );
        if let Some(error) = &doc.error {
            println!("    error: {}", error);
        }
    }
    Ok(())
}

pub fn show(config: Config, id: String, limit: Option<usize>) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let store = workspace.store();
    let document = store
        .get_document(&id)?
        .with_context(|| format!("Document not found: {}", id))?;
    let chunks = store.get_chunks_by_document(&id)?;

    println!(
        "{} ({}): {} chunks",
        document.filename,
        document.status,
        chunks.len()
    );

    let shown = limit.unwrap_or(chunks.len());
    for stored in chunks.iter().take(shown) {
        let chunk = &stored.chunk;
        println!(
            "\n[{}] page {}, {} chars{}",
            chunk.chunk_index,
            chunk.page_number,
            chunk.char_count,
            if stored.has_embedding() { ", embedded" } else { "" }
        );
        println!("{}", preview(&chunk.text, PREVIEW_CHARS));
    }
    if shown < chunks.len() {
        println!("\n... {} more chunks", chunks.len() - shown);
    }
    Ok(())
}

pub fn stats(config: Config, id: String) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let stats = workspace.processor()?.stats(&id)?;
    print_stats(&stats);
    Ok(())
}

pub fn delete(config: Config, id: String) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let record = workspace.processor()?.delete(&id)?;
    workspace.flush()?;
    println!("Deleted {} ({})", record.id, record.filename);
    Ok(())
}

pub fn reset(config: Config, id: String) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let record = workspace.processor()?.reset(&id)?;
    workspace.flush()?;
    println!("Document {} is now {}", record.id, record.status);
    Ok(())
}
