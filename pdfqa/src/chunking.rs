//! Page chunking.
//!
//! [`RecursiveChunker`] splits each page hierarchically: paragraphs, then
//! lines, then words, then single characters. Short pieces are merged back
//! together up to `chunk_size`, and the tail of each chunk (up to
//! `chunk_overlap` characters) is repeated at the head of the next one.
//!
//! All lengths are counted in `char`s so multi-byte text never splits inside
//! a code point.

use std::collections::VecDeque;

use tracing::debug;

use crate::document::{Chunk, Page, strip_empty};

/// Separators tried in order, coarsest first. The empty separator splits
/// into single characters and always applies.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A strategy for splitting pages into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata only: the `id`
/// and `embedding` fields are left empty and filled in by the ingestion
/// pipeline.
pub trait Chunker: Send + Sync {
    /// Split pages into chunks, in page order.
    ///
    /// Returns an empty `Vec` if no page has non-whitespace text.
    fn chunk(&self, pages: &[Page]) -> Vec<Chunk>;
}

/// Splits text recursively by paragraphs → lines → words → characters.
///
/// Output is deterministic for a given input and configuration. Each page is
/// split on its own, and every chunk inherits that page's metadata minus
/// empty entries.
///
/// # Example
///
/// ```rust,ignore
/// use pdfqa::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 150);
/// let chunks = chunker.chunk(&pages);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: maximum number of characters repeated between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split a single text into chunk strings.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(std::mem::take(&mut pending)));
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(pending));
        }

        chunks
    }

    /// Greedily merge small pieces into chunks of at most `chunk_size`
    /// characters, carrying up to `chunk_overlap` characters of trailing
    /// pieces into the next chunk.
    fn merge_pieces(&self, pieces: Vec<&str>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    chunks.push(chunk);
                }
                // Drop leading pieces until what is left fits as overlap and
                // leaves room for the incoming piece.
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }

        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(1000, 150)
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, pages: &[Page]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| {
                let metadata = strip_empty(&page.metadata);
                self.split_text(&page.text).into_iter().map(move |text| Chunk {
                    id: String::new(),
                    text,
                    embedding: Vec::new(),
                    metadata: metadata.clone(),
                })
            })
            .collect();

        debug!(page_count = pages.len(), chunk_count = chunks.len(), "chunked pages");
        chunks
    }
}

/// Split text at a separator, attaching each separator to the start of the
/// piece that follows it. An empty separator splits into characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    for (pos, _) in text.match_indices(separator) {
        if pos > start {
            pieces.push(&text[start..pos]);
        }
        start = pos;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn join_trimmed(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
