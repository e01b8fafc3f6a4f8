//! HTTP quality scorer for OpenAI-compatible chat APIs
//!
//! Sends a page's paragraphs to a hosted model behind any OpenAI-compatible
//! chat-completions endpoint and parses the reply into a `QualitySignal`.
//! The model is asked for a strict JSON verdict; anything that does not
//! parse is reported as `ScorerError::Unavailable` so the caller falls back
//! to the rule engine.

use super::{QualityScorer, ScorerError, ScorerResult};
use crate::config::ScorerBackendConfig;
use crate::types::{QualitySignal, SignalSource};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const VERDICT_INSTRUCTIONS: &str = "You review web page copy for suggestive, \
non-committal language: hedged claims and advice-shaped wording with no \
concrete answer. Rate the page from 0 (fully factual) to 10 (heavily \
suggestive). Respond with ONLY a JSON object of the form \
{\"score\": <0-10>, \"severity\": \"none|mild|moderate|strong\", \
\"implicit_paragraphs\": <count>, \"total_paragraphs\": <count>}.";

/// HTTP scorer backed by a chat-completions model
#[derive(Debug)]
pub struct HttpScorer {
    client: Client,
    config: ScorerBackendConfig,
}

/// Chat-completions request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// The JSON verdict the model is instructed to return
#[derive(Debug, Deserialize)]
struct ScorerVerdict {
    score: f32,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    implicit_paragraphs: Option<usize>,
    #[serde(default)]
    total_paragraphs: Option<usize>,
}

impl HttpScorer {
    /// Create a new HTTP scorer
    pub fn new(config: ScorerBackendConfig) -> ScorerResult<Self> {
        info!(
            "Initializing HTTP quality scorer: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // API key from config or environment
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SEOSCAN_API_KEY").ok());

        if let Some(key) = &api_key {
            let auth_value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| ScorerError::Config(format!("Invalid API key format: {}", e)))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ScorerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn request_verdict(&self, text: &str) -> ScorerResult<ScorerVerdict> {
        let prompt = format!("{}\n\nPage content:\n{}", VERDICT_INSTRUCTIONS, text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.0,
        };

        debug!("Sending quality scoring request to {}", self.config.endpoint);

        // Serialize upfront so the call can run on a scoped thread:
        // reqwest::blocking panics when invoked from inside a tokio runtime.
        let body = serde_json::to_vec(&request)
            .map_err(|e| ScorerError::Unavailable(format!("Failed to serialize request: {}", e)))?;

        let response = std::thread::scope(|s| {
            s.spawn(|| {
                self.client
                    .post(&self.config.endpoint)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
                    .send()
            })
            .join()
        })
        .map_err(|_| ScorerError::Unavailable("HTTP request thread panicked".to_string()))?
        .map_err(|e| ScorerError::Unavailable(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScorerError::Unavailable(format!(
                "HTTP error ({}): {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .map_err(|e| ScorerError::Unavailable(format!("Failed to parse response: {}", e)))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ScorerError::Unavailable("No choices in response".to_string()))?;

        parse_verdict(content)
    }
}

impl QualityScorer for HttpScorer {
    fn score(&self, url: &str, paragraphs: &[String]) -> ScorerResult<QualitySignal> {
        let combined = paragraphs.join(" ");
        let verdict = self.request_verdict(&combined)?;

        let raw = verdict.score.clamp(0.0, 10.0).round() as u8;
        let detail = format!(
            "Model verdict: severity={}, implicit {}/{} paragraphs",
            verdict.severity.as_deref().unwrap_or("unspecified"),
            verdict.implicit_paragraphs.unwrap_or(0),
            verdict
                .total_paragraphs
                .unwrap_or_else(|| paragraphs.len()),
        );

        debug!("Quality verdict for {}: raw score {}", url, raw);
        Ok(QualitySignal::from_raw(raw, SignalSource::External, detail))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Extract and parse the JSON verdict from model output.
///
/// Models wrap JSON in prose or code fences often enough that the parser
/// scans for the outermost braces instead of trusting the whole message.
fn parse_verdict(content: &str) -> ScorerResult<ScorerVerdict> {
    let start = content
        .find('{')
        .ok_or_else(|| ScorerError::Unavailable("No JSON object in model reply".to_string()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| ScorerError::Unavailable("Unterminated JSON in model reply".to_string()))?;
    if end < start {
        return Err(ScorerError::Unavailable(
            "Malformed JSON in model reply".to_string(),
        ));
    }

    let verdict: ScorerVerdict = serde_json::from_str(&content[start..=end])
        .map_err(|e| ScorerError::Unavailable(format!("Malformed verdict JSON: {}", e)))?;

    if !(0.0..=10.0).contains(&verdict.score) {
        return Err(ScorerError::Unavailable(format!(
            "Verdict score {} out of range 0-10",
            verdict.score
        )));
    }

    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_plain_json() {
        let verdict = parse_verdict(
            r#"{"score": 7, "severity": "strong", "implicit_paragraphs": 3, "total_paragraphs": 5}"#,
        )
        .unwrap();
        assert_eq!(verdict.score, 7.0);
        assert_eq!(verdict.severity.as_deref(), Some("strong"));
        assert_eq!(verdict.implicit_paragraphs, Some(3));
        assert_eq!(verdict.total_paragraphs, Some(5));
    }

    #[test]
    fn test_parse_verdict_in_code_fence() {
        let content = "Here is my assessment:\n```json\n{\"score\": 3, \"severity\": \"mild\"}\n```";
        let verdict = parse_verdict(content).unwrap();
        assert_eq!(verdict.score, 3.0);
    }

    #[test]
    fn test_parse_verdict_rejects_prose() {
        assert!(parse_verdict("The page looks fine to me.").is_err());
    }

    #[test]
    fn test_parse_verdict_rejects_out_of_range_score() {
        assert!(parse_verdict(r#"{"score": 42}"#).is_err());
    }

    #[test]
    fn test_parse_verdict_rejects_missing_score() {
        assert!(parse_verdict(r#"{"severity": "mild"}"#).is_err());
    }

    #[test]
    fn test_parse_verdict_optional_fields_default() {
        let verdict = parse_verdict(r#"{"score": 0}"#).unwrap();
        assert!(verdict.severity.is_none());
        assert!(verdict.implicit_paragraphs.is_none());
    }
}
