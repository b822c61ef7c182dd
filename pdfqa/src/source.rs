//! Document sources and input path resolution.
//!
//! A [`DocumentSource`] turns a file path into [`Page`]s. Which path to load
//! is decided by a chain of [`PathResolver`]s tried in order by
//! [`resolve_path`]: an explicit argument, then an environment variable, then
//! an interactive prompt.

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::Page;
use crate::error::{RagError, Result};

/// Loads a document from a path as an ordered list of pages.
pub trait DocumentSource: Send + Sync {
    /// Load all pages of the document at `path`.
    ///
    /// # Errors
    ///
    /// - [`RagError::DocumentNotFound`] if `path` is not a file
    /// - [`RagError::DocumentLoad`] if the file cannot be read or parsed
    fn load(&self, path: &Path) -> Result<Vec<Page>>;
}

/// A [`DocumentSource`] that extracts text from PDF files with `lopdf`.
///
/// Each page carries `source` (the path as given), `page` (0-based index),
/// `page_label` (1-based, as printed) and `total_pages`. Pages whose text
/// cannot be extracted are kept with empty text so indices stay aligned.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSource;

#[cfg(feature = "pdf")]
impl DocumentSource for PdfSource {
    fn load(&self, path: &Path) -> Result<Vec<Page>> {
        if !path.is_file() {
            return Err(RagError::DocumentNotFound { path: path.display().to_string() });
        }

        let document = lopdf::Document::load(path).map_err(|e| RagError::DocumentLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let source = path.display().to_string();
        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
        let total_pages = page_numbers.len();

        let pages = page_numbers
            .iter()
            .enumerate()
            .map(|(index, number)| {
                let text = document.extract_text(&[*number]).unwrap_or_else(|e| {
                    warn!(path = %source, page = index, error = %e, "failed to extract page text");
                    String::new()
                });
                let mut page = Page::new(text, index, source.clone());
                page.metadata.insert("page_label".to_string(), (index + 1).to_string().into());
                page.metadata.insert("total_pages".to_string(), total_pages.into());
                page
            })
            .collect::<Vec<_>>();

        debug!(path = %source, page_count = pages.len(), "loaded pdf");
        Ok(pages)
    }
}

/// One step of the input path resolution chain.
pub trait PathResolver {
    /// Short human-readable name used in logs and errors.
    fn describe(&self) -> String;

    /// Return a candidate path, or `None` to defer to the next resolver.
    fn try_resolve(&self) -> Option<PathBuf>;
}

/// A path given explicitly, usually as a command-line argument.
#[derive(Debug, Clone, Default)]
pub struct ExplicitPath(pub Option<PathBuf>);

impl PathResolver for ExplicitPath {
    fn describe(&self) -> String {
        "command-line argument".to_string()
    }

    fn try_resolve(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// A path already read from configuration (for example `PDF_PATH`).
#[derive(Debug, Clone)]
pub struct ConfiguredPath {
    key: String,
    value: Option<PathBuf>,
}

impl ConfiguredPath {
    pub fn new(key: impl Into<String>, value: Option<PathBuf>) -> Self {
        Self { key: key.into(), value }
    }
}

impl PathResolver for ConfiguredPath {
    fn describe(&self) -> String {
        self.key.clone()
    }

    fn try_resolve(&self) -> Option<PathBuf> {
        self.value.clone()
    }
}

/// Asks the operator for a path on the terminal.
///
/// Does nothing when stdin is not a terminal.
#[derive(Debug, Clone)]
pub struct PromptPath {
    prompt: String,
}

impl PromptPath {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into() }
    }
}

impl PathResolver for PromptPath {
    fn describe(&self) -> String {
        "terminal prompt".to_string()
    }

    fn try_resolve(&self) -> Option<PathBuf> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        read_path(&mut stdin.lock(), &mut std::io::stderr(), &self.prompt)
    }
}

/// Print `prompt` and read one line as a path. Blank input or EOF yields `None`.
fn read_path<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Option<PathBuf> {
    write!(writer, "{prompt}").ok()?;
    writer.flush().ok()?;

    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let trimmed = line.trim().trim_matches(|c| c == '"' || c == '\'');
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Try each resolver in order and return the first candidate that is a file.
///
/// Candidates that do not exist are logged and skipped.
///
/// # Errors
///
/// Returns [`RagError::DocumentNotFound`] naming every resolver tried.
pub fn resolve_path(resolvers: &[&dyn PathResolver]) -> Result<PathBuf> {
    let mut tried = Vec::new();

    for resolver in resolvers {
        match resolver.try_resolve() {
            Some(path) if path.is_file() => {
                debug!(resolver = %resolver.describe(), path = %path.display(), "resolved document path");
                return Ok(path);
            }
            Some(path) => {
                warn!(resolver = %resolver.describe(), path = %path.display(), "path is not a file, skipping");
                tried.push(format!("{} ({})", resolver.describe(), path.display()));
            }
            None => tried.push(resolver.describe()),
        }
    }

    Err(RagError::DocumentNotFound { path: format!("no document resolved from: {}", tried.join(", ")) })
}
