use anyhow::{Context, Result};
use pdfchunk::config::{Config, LogFormat};
use std::path::PathBuf;

pub fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("pdfchunk.toml");
    if config_path.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            config_path.display()
        );
    }

    let toml_content = format!(
        r#"# pdfchunk configuration

[chunking]
# Maximum characters per chunk
chunk_size = {}
# Characters shared by consecutive chunks; must be less than chunk_size
chunk_overlap = {}

[storage]
data_dir = ".pdfchunk"
# Largest accepted upload in bytes
max_file_size = {}

[embedding]
# "hash" needs no service; switch to "http" for real embeddings
backend = "hash"
# endpoint = "https://api.openai.com/v1/embeddings"
# api_key from OPENAI_API_KEY env var
model = "{}"
dimensions = {}
timeout_secs = {}
batch_size = {}
batch_delay_ms = {}

[logging]
# "text" or "json"
format = "{}"
level = "{}"
"#,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
        config.storage.max_file_size,
        config.embedding.model,
        config.embedding.dimensions,
        config.embedding.timeout_secs,
        config.embedding.batch_size,
        config.embedding.batch_delay_ms,
        match config.logging.format {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        },
        config.logging.level,
    );

    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    let data_dir = path.join(".pdfchunk");
    std::fs::create_dir_all(&data_dir)?;
    println!("Created data directory: {}", data_dir.display());

    Ok(())
}
