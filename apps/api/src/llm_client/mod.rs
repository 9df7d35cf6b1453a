/// Completion Client — the single point of entry for all text-completion
/// calls in the interview engine.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through `CompletionBackend`.
///
/// Unlike the embedding path, completion failures are never degraded: there
/// is no meaningful fallback question generator, so an unconfigured or
/// failing backend surfaces as a hard `Unavailable` error. Retry policy,
/// if any, belongs to the caller.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Stop sequence that prevents the model from hallucinating a new human turn.
const STOP_SEQUENCE: &str = "\n\nHuman:";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion backend not configured: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match any recognized completion shape.
    #[error("unrecognized response shape: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: String,
    max_tokens_to_sample: u32,
    temperature: f32,
    stop_sequences: [&'a str; 1],
}

/// Normalized response union over the provider shapes the backend may emit:
/// a legacy `completion` string, Messages-style `content` blocks, or a bare
/// `content` string. The rest of the engine only ever sees the extracted text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CompletionResponse {
    Legacy { completion: String },
    Blocks { content: Vec<ContentBlock> },
    Plain { content: String },
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    pub text: Option<String>,
}

impl CompletionResponse {
    /// Extracts the completion text, if any block carries one.
    pub fn text(&self) -> Option<&str> {
        match self {
            CompletionResponse::Legacy { completion } => Some(completion.as_str()),
            CompletionResponse::Blocks { content } => {
                content.iter().find_map(|b| b.text.as_deref())
            }
            CompletionResponse::Plain { content } => Some(content.as_str()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Capability consumed by the session controller. Injected so tests can
/// substitute a scripted double.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, CompletionError>;
}

/// HTTP completion client. Wraps the configured endpoint with the
/// Human/Assistant role-priming template and a stop sequence.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, CompletionError> {
        let (endpoint, api_key) = match (&self.endpoint, &self.api_key) {
            (Some(e), Some(k)) => (e, k),
            _ => {
                return Err(CompletionError::Unavailable(
                    "COMPLETION_ENDPOINT / COMPLETION_API_KEY not set".to_string(),
                ))
            }
        };

        let request_body = CompletionRequest {
            prompt: format!("\n\nHuman: {prompt}\n\nAssistant:"),
            max_tokens_to_sample: max_tokens,
            temperature,
            stop_sequences: [STOP_SEQUENCE],
        };

        let response = self
            .client
            .post(endpoint)
            .header("x-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(format!("{e}: {}", preview(&body))))?;

        let text = parsed
            .text()
            .ok_or_else(|| CompletionError::Malformed("no text in content blocks".to_string()))?;

        debug!("completion call succeeded ({} chars)", text.len());

        Ok(text.trim().to_string())
    }
}

/// Truncated body preview for error messages, so logs stay bounded.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_completion_shape() {
        let json = r#"{"completion": "What is a mutex?"}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("What is a mutex?"));
    }

    #[test]
    fn test_content_blocks_shape() {
        let json = r#"{"content": [{"text": "Tell me about Rust."}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("Tell me about Rust."));
    }

    #[test]
    fn test_content_blocks_skips_textless_blocks() {
        let json = r#"{"content": [{"text": null}, {"text": "Second block."}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("Second block."));
    }

    #[test]
    fn test_plain_content_string_shape() {
        let json = r#"{"content": "Describe your last project."}"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("Describe your last project."));
    }

    #[test]
    fn test_unrecognized_shape_fails_to_parse() {
        let json = r#"{"message": "hello"}"#;
        assert!(serde_json::from_str::<CompletionResponse>(json).is_err());
    }

    #[test]
    fn test_unconfigured_client_reports_unavailable() {
        let client = HttpCompletionClient::new(None, None);
        assert!(!client.is_configured());

        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt
            .block_on(client.complete("prompt", 500, 0.7))
            .unwrap_err();
        assert!(matches!(err, CompletionError::Unavailable(_)));
    }
}
