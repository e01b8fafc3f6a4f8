//! Batch orchestration
//!
//! Fans a URL batch out across a bounded worker pool and assembles per-URL
//! composite results plus batch-level statistics. The pipeline has two
//! phases with a hard barrier between them: per-URL extraction (fetch via
//! the collaborator, tokenize, quality-score) runs concurrently, then the
//! corpus-wide vectorize + similarity pass runs exactly once over the full
//! corpus — TF-IDF's IDF term is only correct over the complete batch, so
//! similarity is never computed incrementally per URL.
//!
//! Per-URL failures are isolated: a failed fetch is recorded against its
//! URL, excluded from the corpus, and never aborts the batch. Only
//! configuration errors and corpus-wide computation failures are fatal.

pub mod source;

pub use source::{DocumentSource, FetchError, FetchedDocument, StaticSource};

use crate::config::Config;
use crate::quality::QualityAnalyzer;
use crate::scoring::compose;
use crate::similarity::compute_duplicates;
use crate::tokenize::Tokenizer;
use crate::types::{BatchStats, CompositeResult, Corpus, PageUrl, Paragraph, QualitySignal};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome for one input URL: either a full composite result or an explicit
/// error record with a human-readable cause
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlOutcome {
    Completed(CompositeResult),
    Failed { error: String },
}

impl UrlOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn as_completed(&self) -> Option<&CompositeResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

/// Full result of one batch run: one outcome per input URL plus aggregate
/// statistics
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: HashMap<PageUrl, UrlOutcome>,
    pub stats: BatchStats,
}

/// One page's phase-1 output, waiting at the corpus barrier
struct ExtractedPage {
    paragraphs: Vec<Paragraph>,
    signal: QualitySignal,
}

/// Orchestrates batch analysis over a bounded worker pool
pub struct BatchOrchestrator {
    source: Arc<dyn DocumentSource>,
    quality: Arc<QualityAnalyzer>,
    tokenizer: Arc<Tokenizer>,
    config: Config,
}

impl BatchOrchestrator {
    /// Create an orchestrator. Configuration is validated here: a batch
    /// never runs with invalid thresholds or weights.
    pub fn new(
        config: Config,
        source: Arc<dyn DocumentSource>,
        quality: QualityAnalyzer,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            quality: Arc::new(quality),
            tokenizer: Arc::new(Tokenizer::new()),
            config,
        })
    }

    /// Analyze a URL batch.
    ///
    /// Returns one `UrlOutcome` per distinct input URL. Re-running with
    /// unchanged inputs and collaborator responses yields identical scores.
    pub async fn run(&self, urls: &[String]) -> Result<BatchReport> {
        let urls = dedupe_preserving_order(urls);
        info!(
            "Starting batch analysis of {} URLs (workers={})",
            urls.len(),
            self.config.batch.max_workers
        );

        let (extracted, mut failures) = self.extract_all(&urls).await;

        // Corpus barrier: every per-URL extraction has completed (or failed)
        // before the corpus-wide pass begins
        let mut corpus = Corpus::new();
        for url in &urls {
            if let Some(page) = extracted.get(url) {
                corpus.add_document(url.clone(), page.paragraphs.clone());
            }
        }

        debug!(
            "Corpus assembled: {} paragraphs from {} pages",
            corpus.len(),
            corpus.urls().len()
        );

        // Phase 2: corpus-wide vectorization and similarity. CPU-bound, so
        // it runs off the async workers; an error here is batch-fatal.
        let analysis = self.config.analysis.clone();
        let corpus_for_compute = corpus.clone();
        let mut duplicate_reports = tokio::task::spawn_blocking(move || {
            compute_duplicates(&corpus_for_compute, &analysis)
        })
        .await
        .context("corpus-wide similarity computation failed")?;

        // Compose per-URL outcomes in input order
        let mut results: HashMap<PageUrl, UrlOutcome> = HashMap::with_capacity(urls.len());
        let mut completed: Vec<CompositeResult> = Vec::new();

        for url in &urls {
            if let Some(page) = extracted.get(url) {
                let report = duplicate_reports
                    .remove(url)
                    .unwrap_or_else(|| crate::types::DuplicateReport::empty(url.clone(), 0));
                let result = compose(report, page.signal.clone(), &self.config.analysis);
                completed.push(result.clone());
                results.insert(url.clone(), UrlOutcome::Completed(result));
            } else {
                let error = failures
                    .remove(url)
                    .unwrap_or_else(|| "unknown failure".to_string());
                results.insert(url.clone(), UrlOutcome::Failed { error });
            }
        }

        let failed = urls.len() - completed.len();
        let stats = BatchStats::from_results(
            completed.iter(),
            failed,
            self.config.analysis.duplicate_threshold,
        );

        info!(
            "Batch complete: {} succeeded, {} failed, avg duplicate rate {:.1}%",
            stats.succeeded_urls, stats.failed_urls, stats.avg_duplicate_rate
        );

        Ok(BatchReport { results, stats })
    }

    /// Phase 1: fetch, tokenize, and quality-score every URL concurrently,
    /// bounded by the worker pool. Honors the optional batch deadline:
    /// URLs still in flight when it expires are abandoned and marked failed,
    /// while completed extractions keep their place in the corpus.
    async fn extract_all(
        &self,
        urls: &[PageUrl],
    ) -> (HashMap<PageUrl, ExtractedPage>, HashMap<PageUrl, String>) {
        let semaphore = Arc::new(Semaphore::new(self.config.batch.max_workers.max(1)));
        let request_timeout = Duration::from_secs(self.config.batch.request_timeout_secs);
        let mut join_set = JoinSet::new();

        for url in urls.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let source = Arc::clone(&self.source);
            let quality = Arc::clone(&self.quality);
            let tokenizer = Arc::clone(&self.tokenizer);

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (url, Err("worker pool closed".to_string())),
                };
                let outcome =
                    process_url(&url, source, quality, tokenizer, request_timeout).await;
                (url, outcome)
            });
        }

        let deadline = self
            .config
            .batch
            .deadline_secs
            .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

        let mut extracted: HashMap<PageUrl, ExtractedPage> = HashMap::new();
        let mut failures: HashMap<PageUrl, String> = HashMap::new();
        let mut deadline_hit = false;

        loop {
            let joined = match deadline {
                Some(at) if !deadline_hit => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(at) => {
                            warn!("Batch deadline reached; abandoning in-flight URLs");
                            join_set.abort_all();
                            deadline_hit = true;
                            continue;
                        }
                        joined = join_set.join_next() => joined,
                    }
                }
                _ => join_set.join_next().await,
            };

            match joined {
                None => break,
                Some(Ok((url, Ok(page)))) => {
                    extracted.insert(url, page);
                }
                Some(Ok((url, Err(error)))) => {
                    debug!("URL failed: {}", error);
                    failures.insert(url, error);
                }
                Some(Err(join_error)) => {
                    // Aborted tasks surface here; their URLs are resolved
                    // below. A panic in a worker is logged, not fatal.
                    if !join_error.is_cancelled() {
                        warn!("Batch worker panicked: {}", join_error);
                    }
                }
            }
        }

        for url in urls {
            if !extracted.contains_key(url) && !failures.contains_key(url) {
                failures.insert(url.clone(), "batch deadline exceeded".to_string());
            }
        }

        (extracted, failures)
    }
}

/// One unit of phase-1 work: fetch the document, tokenize its paragraphs,
/// and score its language quality. Quality scoring runs here, interleaved
/// with extraction, because it is independent of the corpus-wide phase.
async fn process_url(
    url: &str,
    source: Arc<dyn DocumentSource>,
    quality: Arc<QualityAnalyzer>,
    tokenizer: Arc<Tokenizer>,
    request_timeout: Duration,
) -> Result<ExtractedPage, String> {
    let fetched = tokio::time::timeout(request_timeout, source.fetch(url))
        .await
        .map_err(|_| format!("fetch timed out after {:?}", request_timeout))?
        .map_err(|e| e.to_string())?;

    if !fetched.fetch_succeeded {
        return Err(fetched
            .error
            .unwrap_or_else(|| "collaborator reported fetch failure".to_string()));
    }

    // Tokenization is CPU-bound and the scorer may block on HTTP, so both
    // run off the async workers
    let url_owned = url.to_string();
    tokio::task::spawn_blocking(move || {
        let paragraphs: Vec<Paragraph> = fetched
            .paragraphs
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let tokens = tokenizer.tokenize(text);
                Paragraph::new(url_owned.clone(), index, text.clone(), tokens)
            })
            .collect();

        let signal = quality.score(&url_owned, &fetched.paragraphs);
        ExtractedPage { paragraphs, signal }
    })
    .await
    .map_err(|e| format!("extraction task failed: {}", e))
}

fn dedupe_preserving_order(urls: &[String]) -> Vec<PageUrl> {
    let mut seen = std::collections::HashSet::new();
    urls.iter()
        .filter(|u| seen.insert(u.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn config() -> Config {
        Config::default()
    }

    fn orchestrator_with(documents: Vec<FetchedDocument>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            config(),
            Arc::new(StaticSource::from_documents(documents)),
            QualityAnalyzer::rules_only(),
        )
        .expect("default config is valid")
    }

    #[tokio::test]
    async fn test_run_empty_batch() {
        let orchestrator = orchestrator_with(vec![]);
        let report = orchestrator.run(&[]).await.unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.stats.total_urls, 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_isolated() {
        let orchestrator = orchestrator_with(vec![
            FetchedDocument::ok(
                "https://a.example/page",
                vec!["The filing deadline is fixed by statute.".to_string()],
            ),
            FetchedDocument::failed("https://b.example/page", "connection reset"),
        ]);

        let urls = vec![
            "https://a.example/page".to_string(),
            "https://b.example/page".to_string(),
        ];
        let report = orchestrator.run(&urls).await.unwrap();

        assert_eq!(report.results.len(), 2);
        assert!(report.results["https://a.example/page"].is_completed());
        match &report.results["https://b.example/page"] {
            UrlOutcome::Failed { error } => assert!(error.contains("connection reset")),
            UrlOutcome::Completed(_) => panic!("failed fetch must not complete"),
        }
        assert_eq!(report.stats.succeeded_urls, 1);
        assert_eq!(report.stats.failed_urls, 1);
    }

    #[tokio::test]
    async fn test_unknown_url_recorded_as_failure() {
        let orchestrator = orchestrator_with(vec![]);
        let report = orchestrator
            .run(&["https://missing.example".to_string()])
            .await
            .unwrap();
        assert!(!report.results["https://missing.example"].is_completed());
        assert_eq!(report.stats.failed_urls, 1);
    }

    #[tokio::test]
    async fn test_duplicate_input_urls_collapse() {
        let orchestrator = orchestrator_with(vec![FetchedDocument::ok(
            "https://a.example/page",
            vec!["Original content paragraph here.".to_string()],
        )]);

        let urls = vec![
            "https://a.example/page".to_string(),
            "https://a.example/page".to_string(),
        ];
        let report = orchestrator.run(&urls).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.stats.total_urls, 1);
    }

    /// Source that never resolves, for deadline testing
    struct HangingSource;

    #[async_trait]
    impl DocumentSource for HangingSource {
        async fn fetch(&self, _url: &str) -> Result<FetchedDocument, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_deadline_marks_inflight_urls_failed() {
        let mut cfg = config();
        cfg.batch.deadline_secs = Some(1);
        cfg.batch.request_timeout_secs = 60;

        let orchestrator = BatchOrchestrator::new(
            cfg,
            Arc::new(HangingSource),
            QualityAnalyzer::rules_only(),
        )
        .unwrap();

        let report = orchestrator
            .run(&["https://slow.example".to_string()])
            .await
            .unwrap();

        match &report.results["https://slow.example"] {
            UrlOutcome::Failed { error } => assert!(error.contains("deadline")),
            UrlOutcome::Completed(_) => panic!("hanging fetch must not complete"),
        }
    }

    #[tokio::test]
    async fn test_request_timeout_fails_single_url() {
        let mut cfg = config();
        cfg.batch.request_timeout_secs = 1;

        let orchestrator = BatchOrchestrator::new(
            cfg,
            Arc::new(HangingSource),
            QualityAnalyzer::rules_only(),
        )
        .unwrap();

        let report = orchestrator
            .run(&["https://slow.example".to_string()])
            .await
            .unwrap();

        match &report.results["https://slow.example"] {
            UrlOutcome::Failed { error } => assert!(error.contains("timed out")),
            UrlOutcome::Completed(_) => panic!("timed-out fetch must not complete"),
        }
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut cfg = config();
        cfg.analysis.similarity_threshold = 2.0;
        let result = BatchOrchestrator::new(
            cfg,
            Arc::new(StaticSource::default()),
            QualityAnalyzer::rules_only(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence_order() {
        let urls = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ];
        assert_eq!(dedupe_preserving_order(&urls), vec!["b", "a", "c"]);
    }
}
