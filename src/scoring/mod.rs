//! Composite scoring: duplicate rate + quality signal → one graded verdict
//!
//! Fuses the two per-URL signals with fixed, configurable weights:
//!
//! ```text
//! duplicate_score = max(0, 100 - duplicate_rate)
//! quality_score   = max(0, 100 - raw_score * 10)
//! seo_score       = w_dup * duplicate_score + w_q * quality_score
//! ```
//!
//! The score is monotonically non-increasing in both the duplicate rate and
//! the raw suggestiveness score, and recommendation output is deterministic
//! and order-stable given the same inputs.

use crate::config::AnalysisConfig;
use crate::types::{CompositeResult, DuplicateReport, Grade, ImplicitTier, QualitySignal};
use crate::util::url_directory;
use chrono::Utc;

/// Score contribution of the duplicate signal, in [0, 100]
fn duplicate_score(report: &DuplicateReport) -> f32 {
    (100.0 - report.duplicate_rate).max(0.0)
}

/// Score contribution of the quality signal, in [0, 100]
fn quality_score(signal: &QualitySignal) -> f32 {
    (100.0 - signal.raw_score as f32 * 10.0).max(0.0)
}

/// Fuse one page's duplicate report and quality signal into a graded
/// composite result. Pure given its inputs except for the timestamp.
pub fn compose(
    report: DuplicateReport,
    signal: QualitySignal,
    config: &AnalysisConfig,
) -> CompositeResult {
    let seo_score = config.duplicate_weight * duplicate_score(&report)
        + config.quality_weight * quality_score(&signal);
    let seo_score = seo_score.clamp(0.0, 100.0);
    let grade = Grade::from_score(seo_score);
    let recommendations = recommendations(&report, &signal, seo_score, config);

    CompositeResult {
        url: report.url.clone(),
        directory: url_directory(&report.url),
        seo_score,
        grade,
        duplicate: report,
        quality: signal,
        recommendations,
        analyzed_at: Utc::now(),
    }
}

/// Generate optimization hints from simple rule triggers.
///
/// Rules fire in a fixed order (overall band, language tier, duplicate
/// band), so output ordering is stable for identical inputs.
fn recommendations(
    report: &DuplicateReport,
    signal: &QualitySignal,
    seo_score: f32,
    config: &AnalysisConfig,
) -> Vec<String> {
    let mut out = Vec::new();

    if seo_score >= 85.0 {
        out.push("Page quality is excellent; keep it up".to_string());
    } else if seo_score >= 70.0 {
        out.push("Page quality is good with room for improvement".to_string());
    } else {
        out.push("Page quality needs optimization".to_string());
    }

    match signal.tier {
        ImplicitTier::Strong => {
            out.push("Strong suggestive language detected; rewrite with explicit statements".to_string())
        }
        ImplicitTier::Moderate => {
            out.push("Moderate suggestive language detected; consider rephrasing".to_string())
        }
        ImplicitTier::Mild => {
            out.push("Mild suggestive language detected; minor rewording may help".to_string())
        }
        ImplicitTier::None => out.push("No suggestive language detected; wording is clear".to_string()),
    }

    let rate = report.duplicate_rate;
    let threshold = config.duplicate_threshold;
    if rate > threshold * 2.0 {
        out.push(format!(
            "Duplicate rate is severe ({:.1}%); rewrite duplicated paragraphs",
            rate
        ));
    } else if rate > threshold {
        out.push(format!(
            "Duplicate rate is high ({:.1}%); reduce duplicated paragraphs",
            rate
        ));
    } else if rate > 0.0 {
        out.push(format!("Duplicate rate is acceptable ({:.1}%)", rate));
    } else {
        out.push("Content is fully original across the batch".to_string());
    }

    out
}
