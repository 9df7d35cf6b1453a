//! Prompt Strategy Selector — builds the completion prompt for a turn from
//! the similarity score, extracted terms, interview type, and optimization
//! level. Higher optimization levels trade narrative context for a compact
//! term summary to bound token cost.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interview::session::ConversationTurn;

/// Similarity above which compact prompts target the candidate's matched
/// strengths instead of gap-bridging fundamentals.
const STRENGTH_THRESHOLD: f64 = 0.6;

const CV_TERM_LIMIT: usize = 6;
const JD_TERM_LIMIT: usize = 6;
const MATCH_TERM_LIMIT: usize = 4;
const GAP_TERM_LIMIT: usize = 3;

/// Question preview length in the feedback summary.
const QUESTION_PREVIEW: usize = 100;
/// Answer preview length in the feedback summary.
const ANSWER_PREVIEW: usize = 150;

/// Named strategy controlling prompt verbosity versus token cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Standard,
    Balanced,
    Maximum,
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(OptimizationLevel::Standard),
            "balanced" => Ok(OptimizationLevel::Balanced),
            "maximum" => Ok(OptimizationLevel::Maximum),
            other => Err(format!("unknown optimization level: {other}")),
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptimizationLevel::Standard => "standard",
            OptimizationLevel::Balanced => "balanced",
            OptimizationLevel::Maximum => "maximum",
        };
        f.write_str(s)
    }
}

/// Interview style requested by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterviewType {
    Technical,
    Behavioral,
    Other(String),
}

impl InterviewType {
    pub fn label(&self) -> &str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Behavioral => "behavioral",
            InterviewType::Other(name) => name,
        }
    }
}

impl From<String> for InterviewType {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "technical" => InterviewType::Technical,
            "behavioral" => InterviewType::Behavioral,
            _ => InterviewType::Other(s.to_lowercase()),
        }
    }
}

impl From<InterviewType> for String {
    fn from(t: InterviewType) -> Self {
        t.label().to_string()
    }
}

/// Everything the selector needs to build one question prompt.
pub struct PromptInput<'a> {
    pub similarity: f64,
    pub cv_terms: &'a [String],
    pub jd_terms: &'a [String],
    pub matching: &'a [String],
    pub gaps: &'a [String],
    pub interview_type: &'a InterviewType,
    pub level: OptimizationLevel,
    pub history: &'a [ConversationTurn],
}

/// Builds the full prompt for a question turn.
///
/// Prior Q&A context is appended only for continuation calls (non-empty
/// history); the opening call carries no conversation context. No hard
/// length cap is applied beyond term truncation — compact levels bound
/// size structurally.
pub fn build_question_prompt(input: &PromptInput<'_>) -> String {
    let strategy = match input.level {
        OptimizationLevel::Standard => build_standard_prompt(input),
        OptimizationLevel::Balanced | OptimizationLevel::Maximum => build_compact_prompt(input),
    };

    let context_line = if input.history.is_empty() {
        "First question".to_string()
    } else {
        format!("Follow-up #{}", input.history.len() + 1)
    };

    format!(
        "{strategy}{}\n\nCONTEXT: {context_line}\nTASK: Generate 1 specific interview question using the analysis above.",
        format_history(input.history)
    )
}

/// Full narrative prompt — restates the similarity score and gives
/// interview-type-specific instructions.
fn build_standard_prompt(input: &PromptInput<'_>) -> String {
    let type_label = input.interview_type.label();

    match input.interview_type {
        InterviewType::Technical => format!(
            "You are conducting a technical interview.\n\n\
            Based on the candidate's background and the job requirements, generate a \
            LeetCode-style coding problem that:\n\
            - Tests relevant programming concepts for this role\n\
            - Matches the candidate's experience level (similarity score: {:.2})\n\
            - Includes a clear problem statement\n\
            - Provides 2-3 examples with inputs and outputs\n\
            - Lists constraints\n\
            - Allows discussion of different approaches and time complexity\n\n\
            Create an original coding problem now.",
            input.similarity
        ),
        InterviewType::Behavioral => format!(
            "You are conducting a {type_label} interview.\n\n\
            Tell me about a challenging project you've worked on recently."
        ),
        InterviewType::Other(_) => format!(
            "You are conducting a {type_label} interview.\n\n\
            What interests you most about this {type_label} role?"
        ),
    }
}

/// Compact vector-summary prompt — only the top terms, branching on whether
/// the similarity clears the strength threshold.
fn build_compact_prompt(input: &PromptInput<'_>) -> String {
    let type_label = input.interview_type.label();

    let mut prompt = format!(
        "You are conducting a {type_label} interview.\n\n\
        CANDIDATE SKILLS: {}\n\
        JOB REQUIREMENTS: {}\n\
        SKILL MATCH: {}",
        join_terms(input.cv_terms, CV_TERM_LIMIT),
        join_terms(input.jd_terms, JD_TERM_LIMIT),
        join_terms(input.matching, MATCH_TERM_LIMIT),
    );

    match input.interview_type {
        InterviewType::Technical => {
            if input.similarity > STRENGTH_THRESHOLD {
                let strengths = join_terms(input.matching, 2);
                prompt.push_str(&format!(
                    "\n\nGenerate a LeetCode-style coding problem that tests {strengths} skills specifically. The problem should:\n\
                    - Be tailored to their {strengths} background\n\
                    - Include a clear problem statement\n\
                    - Provide 2-3 examples with inputs and outputs\n\
                    - List any constraints\n\
                    - Test algorithms/data structures relevant to the job requirements\n\
                    - Be solvable in multiple ways to assess problem-solving approach"
                ));
            } else {
                prompt.push_str(&format!(
                    "\nSKILL GAPS: {}\n\n\
                    Generate a LeetCode-style coding problem that bridges the skill gap between candidate and job requirements. The problem should:\n\
                    - Test fundamental programming concepts needed for this role\n\
                    - Include a clear problem statement\n\
                    - Provide 2-3 examples with inputs and outputs\n\
                    - List any constraints\n\
                    - Focus on areas where the candidate can demonstrate learning ability\n\
                    - Allow discussion of different approaches and time complexity",
                    join_terms(input.gaps, GAP_TERM_LIMIT)
                ));
            }
        }
        InterviewType::Behavioral => {
            prompt.push_str("\n\nTell me about a challenging project you've worked on recently.");
        }
        InterviewType::Other(_) => {
            prompt.push_str(&format!(
                "\n\nWhat interests you most about this {type_label} role?"
            ));
        }
    }

    prompt
}

/// Builds the final-feedback prompt: compact strategy header plus a
/// truncated summary of every turn and the structured-feedback task list.
pub fn build_feedback_prompt(input: &PromptInput<'_>) -> String {
    let strategy = build_compact_prompt(input);

    let summary = input
        .history
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            format!(
                "{}. {} → {}",
                i + 1,
                truncate(&turn.question, QUESTION_PREVIEW),
                truncate(&turn.answer, ANSWER_PREVIEW)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{strategy}\n\n\
        INTERVIEW SUMMARY:\n\
        Questions: {}\n\
        {summary}\n\n\
        TASK: Generate comprehensive interview feedback covering:\n\
        1. Vector similarity analysis ({})\n\
        2. Strengths from responses\n\
        3. Improvement areas\n\
        4. Technical assessment\n\
        5. Overall recommendation\n\n\
        Format: Structured sections with specific examples.",
        input.history.len(),
        input.similarity
    )
}

fn format_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let listing = history
        .iter()
        .enumerate()
        .map(|(i, turn)| format!("{}. Q: {}\n   A: {}", i + 1, turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!("\n\nPREVIOUS Q&A:\n{listing}")
}

fn join_terms(terms: &[String], limit: usize) -> String {
    terms
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
