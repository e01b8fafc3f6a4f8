//! Quality scorer configuration

use serde::{Deserialize, Serialize};

/// Configuration for the suggestive-language scorer.
///
/// With no endpoint configured, only the deterministic rule engine runs.
/// With an endpoint, the external model-backed scorer is attempted first and
/// the rule engine remains the fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Chat-completions endpoint of an OpenAI-compatible API
    pub endpoint: Option<String>,
    /// API key; falls back to the `SEOSCAN_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Model name sent with each request
    pub model: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Resolved settings for the HTTP scorer backend
#[derive(Debug, Clone)]
pub struct ScorerBackendConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl QualityConfig {
    /// Resolve the external backend, if one is configured.
    /// Returns `None` when no endpoint is set (rule engine only).
    pub fn resolve_backend(&self) -> Option<ScorerBackendConfig> {
        let endpoint = self.endpoint.clone()?;
        Some(ScorerBackendConfig {
            endpoint,
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
        })
    }
}
