//! seoscan: batch SEO content quality scoring
//!
//! Scores a batch of web pages along two axes and fuses them into one
//! composite grade per URL:
//! - Cross-page near-duplicate content via batch-scoped TF-IDF and pairwise
//!   cosine similarity over paragraphs
//! - Suggestive/hedging language via a pluggable quality scorer (hosted
//!   model with a deterministic keyword-rule fallback)
//!
//! Fetching and HTML parsing are collaborator concerns: the pipeline
//! consumes already-extracted paragraphs through the [`batch::DocumentSource`]
//! capability and returns per-URL [`types::CompositeResult`]s plus
//! batch-level statistics.

pub mod batch;
pub mod config;
pub mod quality;
pub mod scoring;
pub mod similarity;
pub mod tokenize;
pub mod types;
pub mod util;
pub mod vectorize;

pub use batch::{BatchOrchestrator, BatchReport, DocumentSource, UrlOutcome};
pub use config::Config;
pub use scoring::compose;
pub use similarity::compute_duplicates;
pub use types::*;

use crate::quality::QualityAnalyzer;
use anyhow::Result;
use std::sync::Arc;

/// Analyze a URL batch with the given configuration and document source.
///
/// Builds the quality scorer stack from the configuration (external backend
/// if configured, rule engine as fallback) and runs the full two-phase
/// pipeline. Returns one outcome per distinct input URL.
pub async fn analyze_batch(
    urls: &[String],
    config: Config,
    source: Arc<dyn DocumentSource>,
) -> Result<BatchReport> {
    let quality = QualityAnalyzer::from_config(&config.quality);
    let orchestrator = BatchOrchestrator::new(config, source, quality)?;
    orchestrator.run(urls).await
}
