//! Duplicate-detection and composite-scoring configuration

use serde::{Deserialize, Serialize};

/// Analysis thresholds and fusion weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Pairwise cosine similarity cutoff for classifying a paragraph pair
    /// as duplicated (inclusive)
    pub similarity_threshold: f32,
    /// Duplicate-rate alarm threshold in percent; rates above this trigger
    /// recommendations and count toward batch-level high-duplicate stats
    pub duplicate_threshold: f32,
    /// Weight of the duplicate-content signal in the composite score
    pub duplicate_weight: f32,
    /// Weight of the suggestive-language signal in the composite score
    pub quality_weight: f32,
    /// Count similar paragraph pairs within the same page toward that page's
    /// own duplicate rate. Off by default: the signal targets boilerplate
    /// repeated across pages, not repetition within one document.
    pub count_intra_url: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            duplicate_threshold: 15.0,
            duplicate_weight: 0.7,
            quality_weight: 0.3,
            count_intra_url: false,
        }
    }
}
