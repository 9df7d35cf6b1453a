//! Per-session embedding cache.
//!
//! Resume and JD embeddings do not change across the turns of one interview,
//! so callers that pass a `session_id` get their pair computed once and
//! reused. This is the only shared mutable resource in the engine; access is
//! synchronized through a single `RwLock` keyed by session id. No eviction —
//! sessions are short and bounded.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::EmbeddingResult;

/// The cached resume/JD embedding pair for one session.
#[derive(Debug, Clone)]
pub struct SessionEmbeddings {
    pub resume: EmbeddingResult,
    pub job_description: EmbeddingResult,
}

#[derive(Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<Uuid, SessionEmbeddings>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: Uuid) -> Option<SessionEmbeddings> {
        self.entries.read().await.get(&session_id).cloned()
    }

    pub async fn insert(&self, session_id: Uuid, embeddings: SessionEmbeddings) {
        self.entries.write().await.insert(session_id, embeddings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::fallback_embedding;

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = EmbeddingCache::new();
        let id = Uuid::new_v4();

        assert!(cache.get(id).await.is_none());

        cache
            .insert(
                id,
                SessionEmbeddings {
                    resume: fallback_embedding("rust engineer"),
                    job_description: fallback_embedding("rust role"),
                },
            )
            .await;

        let hit = cache.get(id).await.expect("cached pair");
        assert!(hit.resume.is_fallback);
        assert!(hit.job_description.is_fallback);
    }

    #[tokio::test]
    async fn test_cache_is_keyed_per_session() {
        let cache = EmbeddingCache::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache
            .insert(
                a,
                SessionEmbeddings {
                    resume: fallback_embedding("a"),
                    job_description: fallback_embedding("a"),
                },
            )
            .await;

        assert!(cache.get(a).await.is_some());
        assert!(cache.get(b).await.is_none());
    }
}
