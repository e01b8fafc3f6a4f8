//! Document source collaborator interface
//!
//! Fetching and HTML parsing live outside this crate. The orchestrator
//! consumes already-extracted documents through the `DocumentSource`
//! capability; implementations may wrap an HTTP crawler, a cache, or (as
//! the bundled `StaticSource` does) a pre-fetched collection on disk.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors a document source can raise for a single URL.
///
/// These are per-URL failures: they are recorded against the URL and never
/// abort the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("URL not present in source: {0}")]
    NotFound(String),
    #[error("Fetch failed: {0}")]
    Failed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document data: {0}")]
    InvalidData(String),
}

/// A fetched, parsed page as delivered by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub url: String,
    /// Extracted paragraphs in document order
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// Whether the collaborator's fetch/parse succeeded
    #[serde(default = "default_true")]
    pub fetch_succeeded: bool,
    /// Collaborator-reported failure cause
    #[serde(default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FetchedDocument {
    /// A successfully fetched document
    pub fn ok(url: impl Into<String>, paragraphs: Vec<String>) -> Self {
        Self {
            url: url.into(),
            paragraphs,
            fetch_succeeded: true,
            error: None,
        }
    }

    /// A failed fetch with a human-readable cause
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            paragraphs: Vec::new(),
            fetch_succeeded: false,
            error: Some(error.into()),
        }
    }
}

/// Capability for delivering fetched documents to the orchestrator
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Deliver the document for one URL
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// In-memory source over a pre-fetched document collection.
///
/// Backs the CLI (documents loaded from a JSON file) and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, FetchedDocument>,
}

impl StaticSource {
    /// Build from a list of documents, keyed by URL
    pub fn from_documents(documents: Vec<FetchedDocument>) -> Self {
        let documents = documents.into_iter().map(|d| (d.url.clone(), d)).collect();
        Self { documents }
    }

    /// Load a JSON array of fetched documents from disk
    pub fn from_json_file(path: &Path) -> Result<Self, FetchError> {
        let content = std::fs::read_to_string(path)?;
        let documents: Vec<FetchedDocument> = serde_json::from_str(&content)
            .map_err(|e| FetchError::InvalidData(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_documents(documents))
    }

    /// URLs present in the source, in arbitrary order
    pub fn urls(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
