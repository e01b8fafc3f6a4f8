//! Keyword rule engine for suggestive-language detection
//!
//! Deterministic fallback scorer: a pure function of the text against fixed
//! keyword sets, no network, always succeeds. Hedging phrases ("possibly",
//! "in theory", ...) mark suggestive, non-committal writing; emphatic
//! phrases ("must", "strongly recommend", ...) mark forceful steering. Both
//! the original CJK phrase sets and English equivalents are matched.

use super::{QualityScorer, ScorerResult};
use crate::types::{QualitySignal, SignalSource};

/// Hedging phrases indicating suggestive, non-committal language
const HEDGING_KEYWORDS: &[&str] = &[
    // English
    "possibly",
    "perhaps",
    "probably",
    "presumably",
    "in theory",
    "to some extent",
    "generally speaking",
    "usually",
    "it is likely",
    "may exist",
    "cannot rule out",
    "might be",
    // Chinese
    "可能",
    "也许",
    "大概",
    "估计",
    "应该",
    "理论上",
    "某种程度上",
    "一定程度上",
    "一般来说",
    "通常",
    "可能存在",
    "不排除",
    "有可能",
];

/// Emphatic phrases indicating forceful steering
const EMPHATIC_KEYWORDS: &[&str] = &[
    // English
    "strongly recommend",
    "definitely",
    "absolutely must",
    "you must",
    "make sure to",
    // Chinese
    "强烈建议",
    "明确表示",
    "肯定",
    "必须",
    "务必",
];

/// Deterministic keyword/rule scorer
#[derive(Debug, Default)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }

    /// Count non-overlapping occurrences of a phrase in the text
    fn count_occurrences(text: &str, phrase: &str) -> usize {
        text.matches(phrase).count()
    }

    /// Map keyword counts onto a 0-10 raw score.
    ///
    /// Any emphatic match scores 7 (strong); more than three hedges scores 5
    /// (moderate); any hedge scores 3 (mild); otherwise 0.
    fn score_counts(hedging: usize, emphatic: usize) -> u8 {
        if emphatic > 0 {
            7
        } else if hedging > 3 {
            5
        } else if hedging > 0 {
            3
        } else {
            0
        }
    }
}

impl QualityScorer for RuleScorer {
    fn score(&self, _url: &str, paragraphs: &[String]) -> ScorerResult<QualitySignal> {
        let combined = paragraphs.join(" ").to_lowercase();

        let hedging: usize = HEDGING_KEYWORDS
            .iter()
            .map(|k| Self::count_occurrences(&combined, k))
            .sum();
        let emphatic: usize = EMPHATIC_KEYWORDS
            .iter()
            .map(|k| Self::count_occurrences(&combined, k))
            .sum();

        let raw = Self::score_counts(hedging, emphatic);
        let detail = format!(
            "Rule analysis: {} hedging and {} emphatic phrase matches",
            hedging, emphatic
        );

        let mut signal = QualitySignal::from_raw(raw, SignalSource::Rules, detail);
        // The implicit flag tracks hedging matches even when the score is
        // dominated by emphatic phrasing
        signal.has_implicit_language = hedging > 0 || raw > 0;
        Ok(signal)
    }

    fn name(&self) -> &str {
        "rules"
    }
}
