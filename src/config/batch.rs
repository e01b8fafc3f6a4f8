//! Batch orchestration configuration

use serde::{Deserialize, Serialize};

/// Worker pool and timeout settings for batch runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum concurrent per-URL workers
    pub max_workers: usize,
    /// Per-URL collaborator fetch timeout (seconds)
    pub request_timeout_secs: u64,
    /// Optional whole-batch deadline (seconds). URLs still in flight when
    /// the deadline expires are marked failed; completed extractions keep
    /// participating in the corpus.
    pub deadline_secs: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            request_timeout_secs: 15,
            deadline_secs: None,
        }
    }
}
