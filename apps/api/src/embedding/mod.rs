//! Embedding Client — wraps the remote embedding endpoint with a
//! deterministic local fallback.
//!
//! Relevance scoring is an optimization, not a correctness requirement, so
//! this path degrades gracefully: a missing endpoint or a failed remote call
//! produces a deterministic pseudo-embedding instead of an error. The
//! completion path (`llm_client`) deliberately does NOT share this policy.

pub mod cache;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interview::normalize::normalize;

/// Token budget of the embedding model; input is truncated to ~4 chars/token.
const MAX_TOKENS: usize = 8192;
/// Dimension count of the deterministic fallback vector.
pub const FALLBACK_DIMENSIONS: usize = 1536;
/// Model identifier reported for fallback embeddings.
pub const FALLBACK_MODEL: &str = "text-based-fallback";

/// Short vocabulary used to weight fallback vector positions. Words matching
/// these terms get high-magnitude values so related texts stay correlated.
const FALLBACK_TECH_TERMS: [&str; 9] = [
    "javascript",
    "react",
    "node",
    "python",
    "aws",
    "docker",
    "api",
    "sql",
    "git",
];

/// One embedding of one text, produced at most once per session per input.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResult {
    pub vector: Vec<f64>,
    pub dimensions: usize,
    pub model: String,
    pub input_length: usize,
    pub is_fallback: bool,
}

/// Capability consumed by the session controller. Injected so tests can
/// substitute fixed vectors.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, text: &str) -> EmbeddingResult;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    #[serde(rename = "inputText")]
    input_text: &'a str,
    dimensions: u32,
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// HTTP embedding client (Titan-style request body). Falls back to the
/// deterministic local vector on any failure.
#[derive(Clone)]
pub struct RemoteEmbeddingClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    model: String,
}

impl RemoteEmbeddingClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            api_key,
            model,
        }
    }

    async fn embed_remote(&self, text: &str) -> anyhow::Result<EmbeddingResult> {
        let (endpoint, api_key) = match (&self.endpoint, &self.api_key) {
            (Some(e), Some(k)) => (e, k),
            _ => anyhow::bail!("embedding endpoint not configured"),
        };

        let clean = preprocess(text);

        let response = self
            .client
            .post(endpoint)
            .header("x-api-key", api_key)
            .header("content-type", "application/json")
            .json(&EmbeddingRequest {
                input_text: &clean,
                dimensions: 1024,
                normalize: true,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: EmbeddingResponse = response.json().await?;
        anyhow::ensure!(!body.embedding.is_empty(), "empty embedding in response");

        debug!("remote embedding: {} dimensions", body.embedding.len());

        Ok(EmbeddingResult {
            dimensions: body.embedding.len(),
            vector: body.embedding,
            model: self.model.clone(),
            input_length: clean.len(),
            is_fallback: false,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for RemoteEmbeddingClient {
    async fn embed(&self, text: &str) -> EmbeddingResult {
        match self.embed_remote(text).await {
            Ok(result) => result,
            Err(e) => {
                warn!("embedding call failed, using fallback: {e}");
                fallback_embedding(text)
            }
        }
    }
}

/// Normalizes whitespace and truncates to the effective input budget.
fn preprocess(text: &str) -> String {
    let clean = normalize(text);
    let limit = MAX_TOKENS * 4;
    if clean.len() > limit {
        // truncate on a char boundary at or below the byte limit
        let mut end = limit;
        while !clean.is_char_boundary(end) {
            end -= 1;
        }
        clean[..end].to_string()
    } else {
        clean
    }
}

/// Deterministic pseudo-embedding for degraded operation.
///
/// Each word position up to the vector length gets a value derived from a
/// hash of the word: recognized tech terms land in 0.8–1.0, everything else
/// in 0.0–0.6. Identical text always yields an identical vector, so tests
/// can assert exact fallback output.
pub fn fallback_embedding(text: &str) -> EmbeddingResult {
    let clean = preprocess(text);
    let lower = clean.to_lowercase();
    let mut vector = vec![0.0_f64; FALLBACK_DIMENSIONS];

    for (i, word) in lower.split_whitespace().take(FALLBACK_DIMENSIONS).enumerate() {
        let is_tech = FALLBACK_TECH_TERMS.iter().any(|t| word.contains(t));
        let unit = hash_fraction(word);
        vector[i] = if is_tech { 0.8 + unit * 0.2 } else { unit * 0.6 };
    }

    EmbeddingResult {
        vector,
        dimensions: FALLBACK_DIMENSIONS,
        model: FALLBACK_MODEL.to_string(),
        input_length: clean.len(),
        is_fallback: true,
    }
}

/// Maps a word to a stable value in [0,1).
fn hash_fraction(word: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    word.hash(&mut hasher);
    (hasher.finish() % 10_000) as f64 / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_deterministic() {
        let a = fallback_embedding("5 years React and Node.js experience");
        let b = fallback_embedding("5 years React and Node.js experience");
        assert_eq!(a.vector, b.vector);
        assert!(a.is_fallback);
        assert_eq!(a.dimensions, FALLBACK_DIMENSIONS);
        assert_eq!(a.model, FALLBACK_MODEL);
    }

    #[test]
    fn test_fallback_tech_terms_get_high_magnitude() {
        let result = fallback_embedding("react developer");
        // "react" is word 0 and a tech term; "developer" is word 1
        assert!(result.vector[0] >= 0.8 && result.vector[0] <= 1.0);
        assert!(result.vector[1] >= 0.0 && result.vector[1] < 0.6);
    }

    #[test]
    fn test_fallback_vector_length_fixed() {
        let result = fallback_embedding("short");
        assert_eq!(result.vector.len(), FALLBACK_DIMENSIONS);
        // positions past the word count stay zero
        assert_eq!(result.vector[1], 0.0);
    }

    #[test]
    fn test_preprocess_collapses_and_truncates() {
        let clean = preprocess("a\n\n\nb   c");
        assert_eq!(clean, "a b c");

        let long = "x".repeat(MAX_TOKENS * 4 + 100);
        assert_eq!(preprocess(&long).len(), MAX_TOKENS * 4);
    }

    #[tokio::test]
    async fn test_unconfigured_client_falls_back() {
        let client = RemoteEmbeddingClient::new(None, None, "test-model".to_string());
        let result = client.embed("python and docker").await;
        assert!(result.is_fallback);
        assert_eq!(result.model, FALLBACK_MODEL);
    }
}
