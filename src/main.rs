//! pdfchunk: PDF text extraction and overlapping chunking for retrieval

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use pdfchunk::config::{Config, LogFormat, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pdfchunk")]
#[command(about = "Extract, chunk, and embed PDF documents for retrieval")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "pdfchunk.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file and create the data directory
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Extract and chunk a PDF without storing anything
    Chunk {
        /// Path to the PDF
        path: PathBuf,

        /// Maximum characters per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Register a PDF for processing
    Upload {
        /// Path to the PDF
        path: PathBuf,
    },

    /// Extract and chunk a registered document
    Process {
        /// Document ID
        id: String,
    },

    /// Upload and process a PDF in one step
    Ingest {
        /// Path to the PDF
        path: PathBuf,
    },

    /// List documents and their status
    List,

    /// Show a document's chunks
    Show {
        /// Document ID
        id: String,

        /// Maximum chunks to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show document statistics
    Stats {
        /// Document ID
        id: String,
    },

    /// Embed chunks of one document, or of every pending document
    Embed {
        /// Document ID (all pending documents if omitted)
        id: Option<String>,
    },

    /// Show embedding coverage
    EmbeddingStats,

    /// Delete a document and its chunks
    Delete {
        /// Document ID
        id: String,
    },

    /// Move a failed document back to uploaded
    Reset {
        /// Document ID
        id: String,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = logging.level.raised_by(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Init { path } => commands::init::init_config(path),
        Commands::Chunk {
            path,
            chunk_size,
            chunk_overlap,
            format,
        } => commands::chunk::chunk_file(config, path, chunk_size, chunk_overlap, format),
        Commands::Upload { path } => commands::documents::upload(config, path),
        Commands::Process { id } => commands::documents::process(config, id),
        Commands::Ingest { path } => commands::documents::ingest(config, path),
        Commands::List => commands::documents::list(config),
        Commands::Show { id, limit } => commands::documents::show(config, id, limit),
        Commands::Stats { id } => commands::documents::stats(config, id),
        Commands::Embed { id } => commands::embed::embed(config, id),
        Commands::EmbeddingStats => commands::embed::embedding_stats(config),
        Commands::Delete { id } => commands::documents::delete(config, id),
        Commands::Reset { id } => commands::documents::reset(config, id),
    }
}
