//! Axum route handlers for the Interview API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::InterviewType;
use crate::interview::session::{ConversationTurn, InterviewContext, TurnResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub resume_text: String,
    pub jd_text: String,
    #[serde(default = "default_interview_type")]
    pub interview_type: InterviewType,
    /// Overrides the configured default (range 1–50).
    pub max_questions: Option<u32>,
    /// Supply to reuse embeddings across the session's turns.
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ContinueInterviewRequest {
    pub resume_text: String,
    pub jd_text: String,
    #[serde(default = "default_interview_type")]
    pub interview_type: InterviewType,
    pub history: Vec<ConversationTurn>,
    pub user_answer: String,
    /// Completed Q&A pairs including this answer, maintained by the caller.
    pub answered_count: u32,
    pub max_questions: Option<u32>,
    pub session_id: Option<Uuid>,
}

fn default_interview_type() -> InterviewType {
    InterviewType::Technical
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/start
///
/// Opens an interview and returns the first question.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<TurnResult>, AppError> {
    let ctx = InterviewContext::new(
        request.resume_text,
        request.jd_text,
        request.interview_type,
        request.max_questions.unwrap_or(state.config.max_questions),
        state.config.opening_optimization,
    )?;

    let result = state.engine.start_interview(&ctx, request.session_id).await?;

    Ok(Json(result))
}

/// POST /api/v1/interviews/continue
///
/// Records the candidate's answer and returns the next question, or the
/// final feedback once the configured question count is reached.
pub async fn handle_continue(
    State(state): State<AppState>,
    Json(request): Json<ContinueInterviewRequest>,
) -> Result<Json<TurnResult>, AppError> {
    let ctx = InterviewContext::new(
        request.resume_text,
        request.jd_text,
        request.interview_type,
        request.max_questions.unwrap_or(state.config.max_questions),
        state.config.opening_optimization,
    )?;

    let result = state
        .engine
        .continue_interview(
            &ctx,
            request.history,
            &request.user_answer,
            request.answered_count,
            request.session_id,
        )
        .await?;

    Ok(Json(result))
}
