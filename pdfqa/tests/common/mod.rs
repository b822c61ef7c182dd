//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pdfqa::document::{Chunk, Page, SearchResult};
use pdfqa::{
    DocumentSource, EmbeddingProvider, InMemoryVectorStore, LanguageModel, RagError, Result,
    VectorStore,
};

pub const DIM: usize = 64;

/// Bag-of-words embedder: each lowercase word hashes into one of `dims`
/// buckets. Texts sharing words get a high cosine similarity.
#[derive(Default)]
pub struct WordHashEmbedder {
    pub dims: usize,
    pub embed_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
}

impl WordHashEmbedder {
    pub fn new() -> Self {
        Self { dims: DIM, ..Default::default() }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for word in text.split_whitespace() {
            let word: String =
                word.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
            if word.is_empty() {
                continue;
            }
            let hash = word.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            v[(hash % self.dims as u64) as usize] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    pub fn total_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for WordHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Embedder that reports one dimensionality but produces another.
pub struct LyingEmbedder;

#[async_trait]
impl EmbeddingProvider for LyingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0; 3])
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder whose output length changes after the first call.
#[derive(Default)]
pub struct RaggedEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for RaggedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0; if call == 0 { 3 } else { 4 }])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// In-memory store that counts searches.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryVectorStore,
    pub searches: AtomicUsize,
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.inner.create_collection(name, dimensions).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        self.inner.upsert(collection, chunks).await
    }

    async fn delete(&self, collection: &str, ids: &[&str]) -> Result<()> {
        self.inner.delete(collection, ids).await
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(collection, embedding, top_k).await
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

fn broken() -> RagError {
    RagError::VectorStoreError { backend: "broken".into(), message: "connection refused".into() }
}

#[async_trait]
impl VectorStore for BrokenStore {
    async fn create_collection(&self, _name: &str, _dimensions: usize) -> Result<()> {
        Err(broken())
    }

    async fn delete_collection(&self, _name: &str) -> Result<()> {
        Err(broken())
    }

    async fn upsert(&self, _collection: &str, _chunks: &[Chunk]) -> Result<()> {
        Err(broken())
    }

    async fn delete(&self, _collection: &str, _ids: &[&str]) -> Result<()> {
        Err(broken())
    }

    async fn search(&self, _c: &str, _e: &[f32], _k: usize) -> Result<Vec<SearchResult>> {
        Err(broken())
    }
}

pub enum Reply {
    /// Always return this text.
    Fixed(String),
    /// Return everything between `CONTEXTO:` and `REGRAS:`.
    EchoContext,
    /// Always fail.
    Fail,
}

/// Language model double that records every prompt it receives.
pub struct RecordingModel {
    pub reply: Reply,
    pub prompts: Mutex<Vec<(String, f32)>>,
}

impl RecordingModel {
    pub fn new(reply: Reply) -> Self {
        Self { reply, prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(p, _)| p.clone())
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push((prompt.to_string(), temperature));
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::EchoContext => {
                let start = prompt.find("CONTEXTO:").map(|i| i + "CONTEXTO:".len()).unwrap_or(0);
                let end = prompt.find("REGRAS:").unwrap_or(prompt.len());
                Ok(prompt[start..end].trim().to_string())
            }
            Reply::Fail => Err(RagError::GenerationError {
                provider: "recording".into(),
                message: "rate limited".into(),
            }),
        }
    }
}

/// Document source returning fixed pages regardless of path.
pub struct StaticSource(pub Vec<Page>);

impl DocumentSource for StaticSource {
    fn load(&self, _path: &Path) -> Result<Vec<Page>> {
        Ok(self.0.clone())
    }
}

/// A small multi-page document about a fictional product.
pub fn manual_pages() -> Vec<Page> {
    vec![
        Page::new(
            "O produto Lumen X2 foi lançado em 2021.\n\n\
             Ele possui bateria com autonomia de dezoito horas em uso contínuo.",
            0,
            "manual.pdf",
        ),
        Page::new(
            "A garantia do Lumen X2 cobre defeitos de fabricação por dois anos.\n\n\
             O suporte técnico atende de segunda a sexta.",
            1,
            "manual.pdf",
        ),
        Page::new("", 2, "manual.pdf"),
    ]
}
