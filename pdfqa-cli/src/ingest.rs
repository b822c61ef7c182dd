//! Document ingestion command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use pdfqa::openai::OpenAIEmbeddingProvider;
use pdfqa::pgvector::PgVectorStore;
use pdfqa::settings::PDF_PATH;
use pdfqa::{
    ConfiguredPath, ExplicitPath, IngestionPipeline, PdfSource, PromptPath, Provisioner,
    RagConfig, RagError, Settings, collection_name_for, resolve_path,
};
use tracing::{info, warn};

pub struct IngestArgs {
    pub pdf: Option<PathBuf>,
    pub collection: Option<String>,
    pub keep_existing: bool,
}

pub async fn run(settings: &Settings, args: IngestArgs) -> Result<()> {
    let ingest = settings.ingest()?;

    let explicit = ExplicitPath(args.pdf);
    let configured = ConfiguredPath::new(PDF_PATH, ingest.pdf_path.clone());
    let prompt = PromptPath::new("Caminho do PDF: ");
    let path = resolve_path(&[&explicit, &configured, &prompt])?;

    let collection = args
        .collection
        .or(ingest.collection.clone())
        .or_else(|| collection_name_for(&path))
        .with_context(|| format!("cannot derive a collection name from {}", path.display()))?;

    let config = RagConfig::builder().pre_delete_collection(!args.keep_existing).build()?;
    let embedder = OpenAIEmbeddingProvider::from_settings(&ingest.openai, &ingest.embedding_model)?;
    let store = PgVectorStore::connect(&ingest.database_url, ingest.openai.request_timeout).await?;

    let outcome = store.ensure_vector_extension().await;
    if outcome.is_ready() {
        info!(%outcome, "storage provisioned");
    } else {
        warn!(%outcome, "continuing without confirmed vector support");
    }

    let pipeline = IngestionPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .vector_store(Arc::new(store))
        .build()?;

    match pipeline.ingest(&PdfSource, &path, &collection).await {
        Ok(report) => {
            println!(
                "Ingestão concluída: {} trechos gravados na coleção '{}'.",
                report.chunk_count, report.collection
            );
            Ok(())
        }
        Err(RagError::DocumentEmpty { path }) => {
            warn!(path = %path, "no content to ingest");
            println!("Nenhum conteúdo encontrado em {path}.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
