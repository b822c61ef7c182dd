mod chat;
mod ingest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdfqa::Settings;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about a PDF, answered only from its content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a PDF, chunk and embed it, and store it in a collection
    Ingest {
        /// Path to the PDF (falls back to PDF_PATH, then a prompt)
        pdf: Option<PathBuf>,

        /// Target collection (falls back to PGVECTOR_COLLECTION, then the file name)
        #[arg(short, long)]
        collection: Option<String>,

        /// Merge into the collection instead of replacing it
        #[arg(long)]
        keep_existing: bool,
    },
    /// Answer questions interactively from an ingested collection
    Chat,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Ingest { pdf, collection, keep_existing } => {
            ingest::run(&settings, ingest::IngestArgs { pdf, collection, keep_existing }).await
        }
        Command::Chat => chat::run(&settings).await,
    }
}
