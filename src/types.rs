//! Core types for the seoscan pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// URL of an analyzed page
pub type PageUrl = String;

/// A single paragraph of page content, tokenized for vectorization.
///
/// Immutable once built; `index` preserves the paragraph's position in the
/// original document so duplicate attribution stays stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// URL of the page this paragraph came from
    pub url: PageUrl,
    /// Zero-based position within the source document
    pub index: usize,
    /// Raw paragraph text as extracted by the collaborator
    pub raw_text: String,
    /// Token sequence produced by the tokenizer
    pub tokens: Vec<String>,
}

impl Paragraph {
    pub fn new(
        url: impl Into<PageUrl>,
        index: usize,
        raw_text: impl Into<String>,
        tokens: Vec<String>,
    ) -> Self {
        Self {
            url: url.into(),
            index,
            raw_text: raw_text.into(),
            tokens,
        }
    }
}

/// The flat, ordered sequence of all paragraphs across one batch.
///
/// Built once per batch and discarded afterwards; TF-IDF weights are only
/// meaningful relative to a single batch's corpus. Paragraph order within a
/// URL is preserved, and each paragraph carries its source URL so the
/// similarity aggregation can re-group by page.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    paragraphs: Vec<Paragraph>,
    /// URLs in insertion order, including pages that contributed no paragraphs
    urls: Vec<PageUrl>,
    counts: HashMap<PageUrl, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one page's paragraphs. A page with an empty paragraph list is
    /// still recorded so it receives a (zero-rate) duplicate report.
    pub fn add_document(&mut self, url: impl Into<PageUrl>, paragraphs: Vec<Paragraph>) {
        let url = url.into();
        if !self.counts.contains_key(&url) {
            self.urls.push(url.clone());
        }
        *self.counts.entry(url).or_insert(0) += paragraphs.len();
        self.paragraphs.extend(paragraphs);
    }

    /// All paragraphs in corpus order
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// URLs in the order they were added
    pub fn urls(&self) -> &[PageUrl] {
        &self.urls
    }

    /// Number of paragraphs contributed by a URL (0 if unknown)
    pub fn paragraph_count(&self, url: &str) -> usize {
        self.counts.get(url).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// A pair of paragraphs (corpus positions) whose similarity crossed the
/// classification threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub a: usize,
    pub b: usize,
    pub similarity: f32,
}

/// Per-URL duplicate findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub url: PageUrl,
    pub total_paragraphs: usize,
    /// Document-order indexes of paragraphs matched on another page
    pub duplicate_paragraphs: Vec<usize>,
    /// Percentage of this page's paragraphs flagged as duplicates, in [0, 100]
    pub duplicate_rate: f32,
}

impl DuplicateReport {
    /// Build a report, deriving the rate from the counts. A page with zero
    /// paragraphs has rate 0, not NaN.
    pub fn new(
        url: impl Into<PageUrl>,
        total_paragraphs: usize,
        mut duplicate_paragraphs: Vec<usize>,
    ) -> Self {
        duplicate_paragraphs.sort_unstable();
        duplicate_paragraphs.dedup();
        let rate = if total_paragraphs == 0 {
            0.0
        } else {
            (duplicate_paragraphs.len() as f32 / total_paragraphs as f32 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            url: url.into(),
            total_paragraphs,
            duplicate_paragraphs,
            duplicate_rate: rate,
        }
    }

    /// Report for a page with no duplicate findings
    pub fn empty(url: impl Into<PageUrl>, total_paragraphs: usize) -> Self {
        Self::new(url, total_paragraphs, Vec::new())
    }
}

/// Severity bucket for suggestive/hedging language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplicitTier {
    None,
    Mild,
    Moderate,
    Strong,
}

impl ImplicitTier {
    /// Map a 0-10 raw suggestiveness score onto a tier.
    /// Lower bounds are inclusive: 7 is already `Strong`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            s if s >= 7 => Self::Strong,
            s if s >= 5 => Self::Moderate,
            s if s >= 3 => Self::Mild,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for ImplicitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scorer produced a quality signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// Model-backed external scorer
    External,
    /// Deterministic keyword rule engine
    Rules,
}

/// Normalized suggestive-language verdict for one page.
///
/// Both the external scorer and the rule fallback produce this exact shape,
/// so the composite scorer never needs to know which one ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySignal {
    pub has_implicit_language: bool,
    /// Suggestiveness score in 0..=10 (0 = none detected)
    pub raw_score: u8,
    pub tier: ImplicitTier,
    /// Provenance, so callers can tell a fallback verdict from a model one
    pub source: SignalSource,
    /// Human-readable explanation from the scorer
    pub detail: String,
}

impl QualitySignal {
    /// Build a signal from a raw 0-10 score, deriving tier and the
    /// has-implicit flag. Scores above 10 are clamped.
    pub fn from_raw(raw: u8, source: SignalSource, detail: impl Into<String>) -> Self {
        let raw = raw.min(10);
        Self {
            has_implicit_language: raw > 0,
            raw_score: raw,
            tier: ImplicitTier::from_raw(raw),
            source,
            detail: detail.into(),
        }
    }

    /// Neutral signal (nothing detected)
    pub fn clean(source: SignalSource, detail: impl Into<String>) -> Self {
        Self::from_raw(0, source, detail)
    }
}

/// Four-tier quality grade derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Poor,
    VeryPoor,
}

impl Grade {
    /// Grade thresholds are inclusive at the lower bound: exactly 85.0 is
    /// `Excellent`, exactly 70.0 is `Good`, exactly 50.0 is `Poor`.
    pub fn from_score(score: f32) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Poor => "poor",
            Self::VeryPoor => "very_poor",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final per-URL verdict fusing the duplicate and quality signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    pub url: PageUrl,
    /// Composite score in [0, 100]; higher is better
    pub seo_score: f32,
    pub grade: Grade,
    pub duplicate: DuplicateReport,
    pub quality: QualitySignal,
    /// Deterministic, order-stable optimization hints
    pub recommendations: Vec<String>,
    /// host/path grouping slug derived from the URL
    pub directory: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Aggregate statistics over one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_urls: usize,
    pub succeeded_urls: usize,
    pub failed_urls: usize,
    /// Pages whose duplicate rate exceeded the alarm threshold
    pub high_duplicate_count: usize,
    /// Mean duplicate rate over successful pages (0 when none succeeded)
    pub avg_duplicate_rate: f32,
    /// Mean composite score over successful pages
    pub average_seo_score: f32,
    /// Successful pages per grade
    pub grade_distribution: HashMap<String, usize>,
    /// Successful pages with any suggestive language detected
    pub has_implicit_count: usize,
}

impl BatchStats {
    /// Reduce a batch's composite results into summary statistics.
    /// `failed` counts URLs excluded from the averages.
    pub fn from_results<'a, I>(results: I, failed: usize, duplicate_threshold: f32) -> Self
    where
        I: IntoIterator<Item = &'a CompositeResult>,
    {
        let mut stats = BatchStats::default();
        let mut rate_sum = 0.0f32;
        let mut score_sum = 0.0f32;

        for result in results {
            stats.succeeded_urls += 1;
            rate_sum += result.duplicate.duplicate_rate;
            score_sum += result.seo_score;
            if result.duplicate.duplicate_rate > duplicate_threshold {
                stats.high_duplicate_count += 1;
            }
            if result.quality.has_implicit_language {
                stats.has_implicit_count += 1;
            }
            *stats
                .grade_distribution
                .entry(result.grade.as_str().to_string())
                .or_insert(0) += 1;
        }

        stats.failed_urls = failed;
        stats.total_urls = stats.succeeded_urls + failed;
        if stats.succeeded_urls > 0 {
            stats.avg_duplicate_rate = rate_sum / stats.succeeded_urls as f32;
            stats.average_seo_score = score_sum / stats.succeeded_urls as f32;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_raw_boundaries() {
        assert_eq!(ImplicitTier::from_raw(0), ImplicitTier::None);
        assert_eq!(ImplicitTier::from_raw(2), ImplicitTier::None);
        assert_eq!(ImplicitTier::from_raw(3), ImplicitTier::Mild);
        assert_eq!(ImplicitTier::from_raw(4), ImplicitTier::Mild);
        assert_eq!(ImplicitTier::from_raw(5), ImplicitTier::Moderate);
        assert_eq!(ImplicitTier::from_raw(6), ImplicitTier::Moderate);
        assert_eq!(ImplicitTier::from_raw(7), ImplicitTier::Strong);
        assert_eq!(ImplicitTier::from_raw(10), ImplicitTier::Strong);
    }

    #[test]
    fn test_grade_boundaries_inclusive() {
        assert_eq!(Grade::from_score(85.0), Grade::Excellent);
        assert_eq!(Grade::from_score(84.999), Grade::Good);
        assert_eq!(Grade::from_score(70.0), Grade::Good);
        assert_eq!(Grade::from_score(69.999), Grade::Poor);
        assert_eq!(Grade::from_score(50.0), Grade::Poor);
        assert_eq!(Grade::from_score(49.999), Grade::VeryPoor);
        assert_eq!(Grade::from_score(0.0), Grade::VeryPoor);
        assert_eq!(Grade::from_score(100.0), Grade::Excellent);
    }

    #[test]
    fn test_quality_signal_from_raw_clamps() {
        let signal = QualitySignal::from_raw(42, SignalSource::Rules, "test");
        assert_eq!(signal.raw_score, 10);
        assert_eq!(signal.tier, ImplicitTier::Strong);
        assert!(signal.has_implicit_language);
    }

    #[test]
    fn test_quality_signal_clean() {
        let signal = QualitySignal::clean(SignalSource::External, "nothing found");
        assert_eq!(signal.raw_score, 0);
        assert_eq!(signal.tier, ImplicitTier::None);
        assert!(!signal.has_implicit_language);
    }

    #[test]
    fn test_duplicate_report_rate() {
        let report = DuplicateReport::new("https://a.example/p", 4, vec![0, 2]);
        assert_eq!(report.duplicate_rate, 50.0);
        assert_eq!(report.duplicate_paragraphs, vec![0, 2]);
    }

    #[test]
    fn test_duplicate_report_zero_paragraphs() {
        let report = DuplicateReport::new("https://a.example/p", 0, vec![]);
        assert_eq!(report.duplicate_rate, 0.0);
    }

    #[test]
    fn test_duplicate_report_dedups_indexes() {
        let report = DuplicateReport::new("https://a.example/p", 3, vec![1, 1, 0]);
        assert_eq!(report.duplicate_paragraphs, vec![0, 1]);
        assert!((report.duplicate_rate - 2.0 / 3.0 * 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_corpus_tracks_empty_documents() {
        let mut corpus = Corpus::new();
        corpus.add_document("https://a.example", vec![]);
        corpus.add_document(
            "https://b.example",
            vec![Paragraph::new(
                "https://b.example",
                0,
                "text",
                vec!["text".to_string()],
            )],
        );

        assert_eq!(corpus.urls().len(), 2);
        assert_eq!(corpus.paragraph_count("https://a.example"), 0);
        assert_eq!(corpus.paragraph_count("https://b.example"), 1);
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_corpus_preserves_paragraph_order() {
        let mut corpus = Corpus::new();
        let paragraphs: Vec<Paragraph> = (0..3)
            .map(|i| Paragraph::new("https://a.example", i, format!("p{}", i), vec![]))
            .collect();
        corpus.add_document("https://a.example", paragraphs);

        let indexes: Vec<usize> = corpus.paragraphs().iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    fn make_result(url: &str, score: f32, rate: f32, raw: u8) -> CompositeResult {
        CompositeResult {
            url: url.to_string(),
            seo_score: score,
            grade: Grade::from_score(score),
            duplicate: DuplicateReport {
                url: url.to_string(),
                total_paragraphs: 10,
                duplicate_paragraphs: vec![],
                duplicate_rate: rate,
            },
            quality: QualitySignal::from_raw(raw, SignalSource::Rules, ""),
            recommendations: vec![],
            directory: "a.example/root".to_string(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_batch_stats_reduction() {
        let results = vec![
            make_result("https://a.example", 90.0, 0.0, 0),
            make_result("https://b.example", 60.0, 40.0, 5),
        ];
        let stats = BatchStats::from_results(results.iter(), 1, 15.0);

        assert_eq!(stats.total_urls, 3);
        assert_eq!(stats.succeeded_urls, 2);
        assert_eq!(stats.failed_urls, 1);
        assert_eq!(stats.high_duplicate_count, 1);
        assert_eq!(stats.has_implicit_count, 1);
        assert!((stats.avg_duplicate_rate - 20.0).abs() < 1e-4);
        assert!((stats.average_seo_score - 75.0).abs() < 1e-4);
        assert_eq!(stats.grade_distribution.get("excellent"), Some(&1));
        assert_eq!(stats.grade_distribution.get("poor"), Some(&1));
    }

    #[test]
    fn test_batch_stats_empty_never_divides_by_zero() {
        let stats = BatchStats::from_results(std::iter::empty(), 2, 15.0);
        assert_eq!(stats.total_urls, 2);
        assert_eq!(stats.succeeded_urls, 0);
        assert_eq!(stats.avg_duplicate_rate, 0.0);
        assert_eq!(stats.average_seo_score, 0.0);
    }
}
