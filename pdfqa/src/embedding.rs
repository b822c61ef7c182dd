//! Text-to-vector seam used by both ingestion and question answering.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into fixed-length vectors.
///
/// A collection can only be queried with vectors from the model that filled
/// it. Keep `OPENAI_EMBEDDING_MODEL` identical between `ingest` and `chat`.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::EmbeddingProvider;
///
/// let vectors = provider.embed_batch(&["primeiro trecho", "segundo trecho"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text, such as a user question.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in input order.
    ///
    /// Falls back to one [`embed`](EmbeddingProvider::embed) call per text.
    /// Remote providers override this to send the whole slice in a single
    /// request.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Expected vector length for the configured model.
    ///
    /// Ingestion sizes collections from the vectors actually returned and
    /// only logs a mismatch with this value.
    fn dimensions(&self) -> usize;
}
