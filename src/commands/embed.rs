use super::Workspace;
use anyhow::{Context, Result};
use pdfchunk::config::Config;

pub fn embed(config: Config, id: Option<String>) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let embedder = workspace.embedder()?;

    match id {
        Some(id) => {
            let result = embedder.embed_document(&id);
            workspace.flush()?;
            let count = result.with_context(|| format!("Failed to embed document {}", id))?;
            println!("Embedded {} chunks of {}", count, id);
        }
        None => {
            let report = embedder.embed_all()?;
            workspace.flush()?;

            println!(
                "Embedded {} chunks across {} documents",
                report.total_chunks(),
                report.succeeded.len()
            );
            for (doc_id, error) in &report.failed {
                println!("  failed {}: {}", doc_id, error);
            }
            if !report.failed.is_empty() {
                anyhow::bail!("{} documents failed to embed", report.failed.len());
            }
        }
    }
    Ok(())
}

pub fn embedding_stats(config: Config) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let stats = workspace.embedder()?.stats()?;

    println!("\nEmbedding Statistics");
    println!("====================");
    println!("Model:                  {}", stats.embedding_model);
    println!("Dimensions:             {}", stats.embedding_dimension);
    println!("Total chunks:           {}", stats.total_chunks);
    println!("Embedded chunks:        {}", stats.embedded_chunks);
    println!("Without embeddings:     {}", stats.chunks_without_embeddings);
    println!("Coverage:               {:.2}%", stats.embedding_coverage);
    println!(
        "Documents embedded:     {} of {}",
        stats.documents_with_embeddings, stats.total_documents_with_chunks
    );
    Ok(())
}
