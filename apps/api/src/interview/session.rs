//! Interview Session Controller — the state machine driving one mock
//! interview: start → ask → evaluate answer → ask next or produce final
//! feedback.
//!
//! The controller is stateless between calls. Callers resupply the full
//! conversation history each turn; the only shared mutable resource is the
//! optional per-session embedding cache. Backends are injected so tests can
//! substitute scripted doubles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MAX_QUESTIONS_RANGE;
use crate::embedding::cache::{EmbeddingCache, SessionEmbeddings};
use crate::embedding::EmbeddingBackend;
use crate::errors::AppError;
use crate::interview::extractor::{extract_question, extract_technical_problem};
use crate::interview::key_terms::{extract_terms, gap_terms, matching_terms};
use crate::interview::prompts::{
    build_feedback_prompt, build_question_prompt, InterviewType, OptimizationLevel, PromptInput,
};
use crate::interview::similarity::{
    blend, cosine_similarity, match_quality, text_overlap_similarity,
};
use crate::llm_client::{CompletionBackend, CompletionError};

/// Token and temperature settings per turn kind.
const QUESTION_MAX_TOKENS: u32 = 500;
const QUESTION_TEMPERATURE: f32 = 0.7;
const FEEDBACK_MAX_TOKENS: u32 = 2000;
const FEEDBACK_TEMPERATURE: f32 = 0.5;

/// Immutable per-session input. Created once at interview start and
/// resupplied unchanged on every continuation call.
#[derive(Debug, Clone)]
pub struct InterviewContext {
    pub resume_text: String,
    pub job_description: String,
    pub interview_type: InterviewType,
    pub max_questions: u32,
    pub optimization: OptimizationLevel,
}

impl InterviewContext {
    pub fn new(
        resume_text: String,
        job_description: String,
        interview_type: InterviewType,
        max_questions: u32,
        optimization: OptimizationLevel,
    ) -> Result<Self, AppError> {
        if resume_text.trim().is_empty() {
            return Err(AppError::InvalidInput("resume text is required".to_string()));
        }
        if job_description.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "job description is required".to_string(),
            ));
        }
        if !MAX_QUESTIONS_RANGE.contains(&max_questions) {
            return Err(AppError::InvalidInput(format!(
                "max_questions must be between {} and {}",
                MAX_QUESTIONS_RANGE.start(),
                MAX_QUESTIONS_RANGE.end()
            )));
        }

        Ok(Self {
            resume_text,
            job_description,
            interview_type,
            max_questions,
            optimization,
        })
    }
}

/// One question/answer exchange. The answer is empty only for the turn
/// currently awaiting a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Token-cost accounting for one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct TokenOptimization {
    pub original_text_length: usize,
    pub optimized_prompt_length: usize,
    pub tokens_saved: i64,
    pub optimization_level: OptimizationLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnMetadata {
    pub similarity: f64,
    pub match_quality: String,
    pub embedding_model: String,
    pub embedding_fallback: bool,
    pub generated_at: DateTime<Utc>,
    pub token_optimization: TokenOptimization,
}

/// Externally visible output of one controller invocation. Never persisted
/// by the engine — persistence is the caller's responsibility.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub content: String,
    pub is_complete: bool,
    pub question_count: u32,
    pub metadata: TurnMetadata,
}

/// Semantic analysis of the resume/JD pair, computed once per turn (or
/// fetched from the session cache).
struct RelevanceAnalysis {
    similarity: f64,
    cv_terms: Vec<String>,
    jd_terms: Vec<String>,
    matching: Vec<String>,
    gaps: Vec<String>,
    embedding_model: String,
    used_fallback: bool,
}

/// The orchestration engine. Holds injected backends only — no per-session
/// state lives here.
pub struct InterviewEngine {
    completion: Arc<dyn CompletionBackend>,
    embedding: Arc<dyn EmbeddingBackend>,
    cache: Arc<EmbeddingCache>,
}

impl InterviewEngine {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        embedding: Arc<dyn EmbeddingBackend>,
        cache: Arc<EmbeddingCache>,
    ) -> Self {
        Self {
            completion,
            embedding,
            cache,
        }
    }

    /// Starts an interview: analyzes resume/JD relevance, builds the opening
    /// prompt (no conversation context), and returns the first question.
    pub async fn start_interview(
        &self,
        ctx: &InterviewContext,
        session_id: Option<Uuid>,
    ) -> Result<TurnResult, AppError> {
        let analysis = self.analyze(ctx, session_id).await;
        info!(
            "starting {} interview: similarity={}",
            ctx.interview_type.label(),
            analysis.similarity
        );

        let prompt = build_question_prompt(&self.prompt_input(ctx, &analysis, ctx.optimization, &[]));
        let raw = self.complete(&prompt, QUESTION_MAX_TOKENS, QUESTION_TEMPERATURE).await?;
        let content = self.extract_content(ctx, &raw);

        Ok(self.turn_result(ctx, &analysis, content, 1, false, ctx.optimization, prompt.len(), 0))
    }

    /// Advances an interview by one turn. The supplied answer closes the last
    /// open turn; when the answered count reaches `max_questions` the final
    /// feedback is produced instead of another question (inclusive boundary).
    pub async fn continue_interview(
        &self,
        ctx: &InterviewContext,
        mut history: Vec<ConversationTurn>,
        user_answer: &str,
        answered_count: u32,
        session_id: Option<Uuid>,
    ) -> Result<TurnResult, AppError> {
        if user_answer.trim().is_empty() {
            return Err(AppError::InvalidInput("user answer is required".to_string()));
        }

        let open_turn = history.last_mut().ok_or_else(|| {
            AppError::InvalidInput("history has no question awaiting an answer".to_string())
        })?;
        if !open_turn.answer.trim().is_empty() {
            // Last pair is already answered — a resent answer is not merged
            // or overwritten. The caller's record and ours disagree.
            return Err(AppError::InvalidInput(
                "last question is already answered".to_string(),
            ));
        }
        open_turn.answer = user_answer.to_string();

        // The caller-maintained counter must agree with the history length
        // (completed pairs including this answer) to within one.
        let questions_answered = history.len() as u32;
        if answered_count.abs_diff(questions_answered) > 1 {
            return Err(AppError::InvalidInput(format!(
                "answered_count {answered_count} disagrees with history length {questions_answered}"
            )));
        }

        let analysis = self.analyze(ctx, session_id).await;

        if questions_answered >= ctx.max_questions {
            info!(
                "interview complete after {questions_answered} answers, generating feedback"
            );
            let history_len: usize = history
                .iter()
                .map(|t| t.question.len() + t.answer.len())
                .sum();
            let prompt = build_feedback_prompt(&self.prompt_input(
                ctx,
                &analysis,
                OptimizationLevel::Balanced,
                &history,
            ));
            let content = self
                .complete(&prompt, FEEDBACK_MAX_TOKENS, FEEDBACK_TEMPERATURE)
                .await?;

            return Ok(self.turn_result(
                ctx,
                &analysis,
                content,
                questions_answered,
                true,
                OptimizationLevel::Balanced,
                prompt.len(),
                history_len,
            ));
        }

        let prompt =
            build_question_prompt(&self.prompt_input(ctx, &analysis, ctx.optimization, &history));
        let raw = self.complete(&prompt, QUESTION_MAX_TOKENS, QUESTION_TEMPERATURE).await?;
        let content = self.extract_content(ctx, &raw);

        Ok(self.turn_result(
            ctx,
            &analysis,
            content,
            questions_answered + 1,
            false,
            ctx.optimization,
            prompt.len(),
            0,
        ))
    }

    /// Embeds resume and JD (concurrently, or via the session cache), then
    /// blends cosine and term-overlap similarity. Never fails — the
    /// embedding path degrades to the deterministic fallback.
    async fn analyze(&self, ctx: &InterviewContext, session_id: Option<Uuid>) -> RelevanceAnalysis {
        let cached = match session_id {
            Some(id) => self.cache.get(id).await,
            None => None,
        };

        let pair = match cached {
            Some(pair) => pair,
            None => {
                let (resume, job_description) = tokio::join!(
                    self.embedding.embed(&ctx.resume_text),
                    self.embedding.embed(&ctx.job_description)
                );
                let pair = SessionEmbeddings {
                    resume,
                    job_description,
                };
                if let Some(id) = session_id {
                    self.cache.insert(id, pair.clone()).await;
                }
                pair
            }
        };

        let used_fallback = pair.resume.is_fallback || pair.job_description.is_fallback;
        if used_fallback {
            warn!("embedding degraded: relevance scored with fallback vectors");
        }

        let embedding_sim = cosine_similarity(&pair.resume.vector, &pair.job_description.vector);

        let cv_terms = extract_terms(&ctx.resume_text);
        let jd_terms = extract_terms(&ctx.job_description);
        let text_sim = text_overlap_similarity(&cv_terms, &jd_terms);
        let similarity = blend(embedding_sim, text_sim, used_fallback);

        let matching = matching_terms(&cv_terms, &jd_terms);
        let gaps = gap_terms(&cv_terms, &jd_terms);

        RelevanceAnalysis {
            similarity,
            cv_terms,
            jd_terms,
            matching,
            gaps,
            embedding_model: pair.resume.model.clone(),
            used_fallback,
        }
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AppError> {
        self.completion
            .complete(prompt, max_tokens, temperature)
            .await
            .map_err(|e| match e {
                CompletionError::Malformed(msg) => AppError::MalformedModelOutput(msg),
                other => AppError::CompletionUnavailable(other.to_string()),
            })
    }

    fn extract_content(&self, ctx: &InterviewContext, raw: &str) -> String {
        match ctx.interview_type {
            InterviewType::Technical => extract_technical_problem(raw),
            _ => extract_question(raw),
        }
    }

    fn prompt_input<'a>(
        &self,
        ctx: &'a InterviewContext,
        analysis: &'a RelevanceAnalysis,
        level: OptimizationLevel,
        history: &'a [ConversationTurn],
    ) -> PromptInput<'a> {
        PromptInput {
            similarity: analysis.similarity,
            cv_terms: &analysis.cv_terms,
            jd_terms: &analysis.jd_terms,
            matching: &analysis.matching,
            gaps: &analysis.gaps,
            interview_type: &ctx.interview_type,
            level,
            history,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn turn_result(
        &self,
        ctx: &InterviewContext,
        analysis: &RelevanceAnalysis,
        content: String,
        question_count: u32,
        is_complete: bool,
        level: OptimizationLevel,
        prompt_length: usize,
        history_length: usize,
    ) -> TurnResult {
        let original_text_length =
            ctx.resume_text.len() + ctx.job_description.len() + history_length;
        let tokens_saved =
            ((original_text_length as f64 - prompt_length as f64) / 4.0).ceil() as i64;

        TurnResult {
            content,
            is_complete,
            question_count,
            metadata: TurnMetadata {
                similarity: analysis.similarity,
                match_quality: match_quality(analysis.similarity).to_string(),
                embedding_model: analysis.embedding_model.clone(),
                embedding_fallback: analysis.used_fallback,
                generated_at: Utc::now(),
                token_optimization: TokenOptimization {
                    original_text_length,
                    optimized_prompt_length: prompt_length,
                    tokens_saved,
                    optimization_level: level,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{fallback_embedding, EmbeddingResult};
    use async_trait::async_trait;

    struct FixedCompletion(&'static str);

    #[async_trait]
    impl CompletionBackend for FixedCompletion {
        async fn complete(
            &self,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, CompletionError> {
            Ok(self.0.to_string())
        }
    }

    struct UnavailableCompletion;

    #[async_trait]
    impl CompletionBackend for UnavailableCompletion {
        async fn complete(
            &self,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, CompletionError> {
            Err(CompletionError::Unavailable("no credentials".to_string()))
        }
    }

    /// Embedding double using the deterministic fallback vectors.
    struct FallbackEmbedding;

    #[async_trait]
    impl EmbeddingBackend for FallbackEmbedding {
        async fn embed(&self, text: &str) -> EmbeddingResult {
            fallback_embedding(text)
        }
    }

    const RESUME: &str = "5 years React, Node.js";
    const JOB: &str = "Looking for React and AWS experience";

    fn engine(completion: Arc<dyn CompletionBackend>) -> InterviewEngine {
        InterviewEngine::new(
            completion,
            Arc::new(FallbackEmbedding),
            Arc::new(EmbeddingCache::new()),
        )
    }

    fn context(max_questions: u32, interview_type: InterviewType) -> InterviewContext {
        InterviewContext::new(
            RESUME.to_string(),
            JOB.to_string(),
            interview_type,
            max_questions,
            OptimizationLevel::Maximum,
        )
        .unwrap()
    }

    fn open_history(n: usize) -> Vec<ConversationTurn> {
        let mut history: Vec<ConversationTurn> = (0..n.saturating_sub(1))
            .map(|i| ConversationTurn {
                question: format!("Question {i} about React architecture?"),
                answer: format!("Answer {i}"),
            })
            .collect();
        history.push(ConversationTurn {
            question: "Final open question about deployment?".to_string(),
            answer: String::new(),
        });
        history
    }

    #[test]
    fn test_context_rejects_empty_resume() {
        let err = InterviewContext::new(
            "  ".to_string(),
            JOB.to_string(),
            InterviewType::Technical,
            10,
            OptimizationLevel::Standard,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_context_rejects_out_of_range_max_questions() {
        let err = InterviewContext::new(
            RESUME.to_string(),
            JOB.to_string(),
            InterviewType::Technical,
            51,
            OptimizationLevel::Standard,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_start_returns_first_question() {
        let engine = engine(Arc::new(FixedCompletion(
            "What is your experience with React state management",
        )));
        let ctx = context(10, InterviewType::Behavioral);

        let result = engine.start_interview(&ctx, None).await.unwrap();
        assert_eq!(result.question_count, 1);
        assert!(!result.is_complete);
        assert!(result.content.ends_with('?') || result.content.ends_with('.'));
        assert!(result.metadata.similarity >= 0.0 && result.metadata.similarity <= 1.0);
        assert!(result.metadata.embedding_fallback);
    }

    #[tokio::test]
    async fn test_start_end_to_end_term_analysis() {
        let engine = engine(Arc::new(FixedCompletion("Describe a project using React")));
        let ctx = context(10, InterviewType::Behavioral);

        let result = engine.start_interview(&ctx, None).await.unwrap();
        assert!(!result.content.is_empty());

        // the analysis behind the metadata: react matches, aws is a gap
        let cv_terms = extract_terms(RESUME);
        let jd_terms = extract_terms(JOB);
        assert!(matching_terms(&cv_terms, &jd_terms).contains(&"react".to_string()));
        assert!(gap_terms(&cv_terms, &jd_terms).contains(&"aws".to_string()));
    }

    #[tokio::test]
    async fn test_completion_unavailable_is_a_hard_error() {
        let engine = engine(Arc::new(UnavailableCompletion));
        let ctx = context(10, InterviewType::Technical);

        let err = engine.start_interview(&ctx, None).await.unwrap_err();
        assert!(matches!(err, AppError::CompletionUnavailable(_)));
    }

    #[tokio::test]
    async fn test_continue_rejects_empty_answer() {
        let engine = engine(Arc::new(FixedCompletion("Next question?")));
        let ctx = context(10, InterviewType::Behavioral);

        let err = engine
            .continue_interview(&ctx, open_history(1), "  ", 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_continue_rejects_already_answered_history() {
        let engine = engine(Arc::new(FixedCompletion("Next question?")));
        let ctx = context(10, InterviewType::Behavioral);

        let history = vec![ConversationTurn {
            question: "Tell me about your background?".to_string(),
            answer: "Already answered".to_string(),
        }];
        let err = engine
            .continue_interview(&ctx, history, "new answer", 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_continue_rejects_counter_disagreement() {
        let engine = engine(Arc::new(FixedCompletion("Next question?")));
        let ctx = context(10, InterviewType::Behavioral);

        let err = engine
            .continue_interview(&ctx, open_history(2), "my answer", 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_question_count_increases_until_max_then_feedback() {
        let engine = engine(Arc::new(FixedCompletion(
            "How would you design a caching layer for this service",
        )));
        let ctx = context(3, InterviewType::Behavioral);

        let first = engine
            .continue_interview(&ctx, open_history(1), "answer one", 1, None)
            .await
            .unwrap();
        assert!(!first.is_complete);
        assert_eq!(first.question_count, 2);

        let second = engine
            .continue_interview(&ctx, open_history(2), "answer two", 2, None)
            .await
            .unwrap();
        assert!(!second.is_complete);
        assert_eq!(second.question_count, 3);

        let third = engine
            .continue_interview(&ctx, open_history(3), "answer three", 3, None)
            .await
            .unwrap();
        assert!(third.is_complete);
        assert_eq!(third.question_count, 3);
        assert_eq!(
            third.metadata.token_optimization.optimization_level,
            OptimizationLevel::Balanced
        );
    }

    #[tokio::test]
    async fn test_feedback_boundary_is_inclusive() {
        let engine = engine(Arc::new(FixedCompletion("Strengths: communication.")));
        let ctx = context(1, InterviewType::Behavioral);

        let result = engine
            .continue_interview(&ctx, open_history(1), "only answer", 1, None)
            .await
            .unwrap();
        assert!(result.is_complete);
    }

    #[tokio::test]
    async fn test_session_cache_reuses_embeddings() {
        let cache = Arc::new(EmbeddingCache::new());
        let engine = InterviewEngine::new(
            Arc::new(FixedCompletion("What draws you to this role")),
            Arc::new(FallbackEmbedding),
            cache.clone(),
        );
        let ctx = context(10, InterviewType::Behavioral);
        let session_id = Uuid::new_v4();

        assert!(cache.get(session_id).await.is_none());
        engine.start_interview(&ctx, Some(session_id)).await.unwrap();
        assert!(cache.get(session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_technical_start_preserves_problem_structure() {
        let engine = engine(Arc::new(FixedCompletion(
            "Here is a coding problem for you: Reverse a linked list.\n\nExample 1:\nInput: 1->2->3\nOutput: 3->2->1\n\nConstraints: up to 10^5 nodes",
        )));
        let ctx = context(10, InterviewType::Technical);

        let result = engine.start_interview(&ctx, None).await.unwrap();
        assert!(result.content.contains("Input: 1->2->3"));
        assert!(result.content.contains("Constraints:"));
    }
}
