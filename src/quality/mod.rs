//! Suggestive-language quality scoring
//!
//! Two scorer strategies sit behind one trait: an external model-backed
//! scorer (HTTP, OpenAI-compatible) and a deterministic keyword rule engine.
//! Selection is a runtime fallback policy, not a hierarchy: the external
//! scorer is attempted first and any failure falls back to the rule engine,
//! with the result's `source` field marking provenance. A scorer failure
//! therefore never surfaces to the batch as a URL failure.

mod http;
mod rules;

pub use http::HttpScorer;
pub use rules::RuleScorer;

use crate::config::QualityConfig;
use crate::types::QualitySignal;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Errors a quality scorer can raise
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    /// Scorer unreachable, timed out, or returned a malformed response
    #[error("Scorer unavailable: {0}")]
    Unavailable(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Scorer misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for scorer operations
pub type ScorerResult<T> = Result<T, ScorerError>;

/// Capability implemented by every quality scorer.
///
/// Object-safe so strategies can be swapped behind `dyn QualityScorer`.
/// Implementations must be usable from blocking worker threads.
pub trait QualityScorer: Send + Sync + Debug {
    /// Score one page's paragraphs for suggestive language
    fn score(&self, url: &str, paragraphs: &[String]) -> ScorerResult<QualitySignal>;

    /// Scorer name for logs (e.g. "http", "rules")
    fn name(&self) -> &str;
}

/// Scorer stack applying the external-then-fallback policy.
///
/// The rule engine is a pure function of the text and always succeeds, so
/// `score` is infallible at this level.
#[derive(Debug)]
pub struct QualityAnalyzer {
    external: Option<Box<dyn QualityScorer>>,
    fallback: RuleScorer,
}

impl QualityAnalyzer {
    /// Build the stack from configuration. Without a configured endpoint
    /// only the rule engine runs.
    pub fn from_config(config: &QualityConfig) -> Self {
        let external: Option<Box<dyn QualityScorer>> = match config.resolve_backend() {
            Some(backend) => match HttpScorer::new(backend) {
                Ok(scorer) => Some(Box::new(scorer)),
                Err(e) => {
                    warn!("External quality scorer unavailable at startup: {}", e);
                    None
                }
            },
            None => None,
        };

        Self {
            external,
            fallback: RuleScorer::new(),
        }
    }

    /// Stack with an explicit external scorer (used by tests and embedders)
    pub fn with_external(external: Box<dyn QualityScorer>) -> Self {
        Self {
            external: Some(external),
            fallback: RuleScorer::new(),
        }
    }

    /// Rule engine only
    pub fn rules_only() -> Self {
        Self {
            external: None,
            fallback: RuleScorer::new(),
        }
    }

    /// Score one page, falling back to the rule engine on any external
    /// scorer failure
    pub fn score(&self, url: &str, paragraphs: &[String]) -> QualitySignal {
        if let Some(external) = &self.external {
            match external.score(url, paragraphs) {
                Ok(signal) => {
                    debug!("Quality signal for {} from scorer '{}'", url, external.name());
                    return signal;
                }
                Err(e) => {
                    warn!(
                        "Quality scorer '{}' failed for {}: {}; falling back to rules",
                        external.name(),
                        url,
                        e
                    );
                }
            }
        }

        self.fallback
            .score(url, paragraphs)
            .unwrap_or_else(|_| unreachable!("rule scorer is infallible"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalSource;

    #[derive(Debug)]
    struct FailingScorer;

    impl QualityScorer for FailingScorer {
        fn score(&self, _url: &str, _paragraphs: &[String]) -> ScorerResult<QualitySignal> {
            Err(ScorerError::Unavailable("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Debug)]
    struct FixedScorer(u8);

    impl QualityScorer for FixedScorer {
        fn score(&self, _url: &str, _paragraphs: &[String]) -> ScorerResult<QualitySignal> {
            Ok(QualitySignal::from_raw(self.0, SignalSource::External, "fixed"))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_external_scorer_preferred() {
        let analyzer = QualityAnalyzer::with_external(Box::new(FixedScorer(7)));
        let signal = analyzer.score("https://a.example", &["text".to_string()]);
        assert_eq!(signal.raw_score, 7);
        assert_eq!(signal.source, SignalSource::External);
    }

    #[test]
    fn test_fallback_on_external_failure() {
        let analyzer = QualityAnalyzer::with_external(Box::new(FailingScorer));
        let signal = analyzer.score(
            "https://a.example",
            &["plain factual statement about fees".to_string()],
        );
        assert_eq!(signal.source, SignalSource::Rules);
    }

    #[test]
    fn test_rules_only_stack() {
        let analyzer = QualityAnalyzer::rules_only();
        let signal = analyzer.score("https://a.example", &["clear answer".to_string()]);
        assert_eq!(signal.source, SignalSource::Rules);
    }

    #[test]
    fn test_from_config_without_endpoint_has_no_external() {
        let analyzer = QualityAnalyzer::from_config(&QualityConfig::default());
        assert!(analyzer.external.is_none());
    }
}
