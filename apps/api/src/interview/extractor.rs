//! Response Extractor — normalizes raw completion output into a clean
//! interview question or technical-problem statement. Model output is
//! fragile: it arrives with preambles, meta-commentary, and missing
//! punctuation, all of which is stripped here.

use std::sync::LazyLock;

use regex::Regex;

/// Preamble patterns stripped from question responses, anchored at the start.
static QUESTION_PREFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^.*?Here is.*?question.*?:",
        r"(?i)^.*?Based on.*?analysis.*?:",
        r"(?i)^.*?I would ask.*?:",
        r"(?i)^.*?Sample question.*?:",
        r"(?i)^.*?Question:\s*",
        r"(?i)^.*?Q:\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid prefix pattern"))
    .collect()
});

/// Preamble patterns stripped from technical-problem responses.
static PROBLEM_PREFIXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^.*?Here is a LeetCode-style.*?:",
        r"(?i)^.*?Here is a coding problem.*?:",
        r"(?i)^.*?Here is a technical question.*?:",
        r"(?i)^.*?Based on.*?analysis.*?:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid prefix pattern"))
    .collect()
});

/// Meta-commentary phrases. A line is either dropped or truncated where one
/// of these begins.
const META_PHRASES: [&str; 5] = [
    "the idea is",
    "this question",
    "let me know",
    "the goal",
    "i'm interested",
];

/// Structural markers indicating a multi-line problem statement that must be
/// preserved verbatim rather than condensed to one line.
const PROBLEM_MARKERS: [&str; 5] = ["**Problem:", "Example", "Input:", "Output:", "Constraints:"];

/// Interrogative cues that call for a terminal `?`.
const INTERROGATIVE_CUES: [&str; 11] = [
    "how",
    "what",
    "why",
    "when",
    "where",
    "can you",
    "could you",
    "would you",
    "tell me",
    "describe",
    "explain",
];

/// Lines shorter than this are considered trivial and skipped.
const MIN_QUESTION_LEN: usize = 20;

/// Extracts a single clean question from raw model output.
pub fn extract_question(raw: &str) -> String {
    let clean = strip_prefixes(raw, &QUESTION_PREFIXES);

    let lines: Vec<&str> = clean
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return ensure_terminal_punctuation(strip_quotes(&clean));
    }

    let mut question = lines.iter().find_map(|line| candidate_question(line));

    if question.is_none() {
        question = lines
            .iter()
            .find(|l| l.len() > MIN_QUESTION_LEN)
            .map(|l| l.to_string());
    }

    let question = question.unwrap_or(clean);
    ensure_terminal_punctuation(strip_quotes(&question))
}

/// Extracts a technical problem statement. The full multi-line body is
/// preserved when structural markers are present; otherwise blank lines are
/// dropped and the rest kept.
pub fn extract_technical_problem(raw: &str) -> String {
    let clean = strip_prefixes(raw, &PROBLEM_PREFIXES);

    if PROBLEM_MARKERS.iter().any(|m| clean.contains(m)) {
        return clean;
    }

    let lines: Vec<&str> = clean
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        clean
    } else {
        lines.join("\n")
    }
}

fn strip_prefixes(raw: &str, prefixes: &[Regex]) -> String {
    let mut clean = raw.trim().to_string();
    for pattern in prefixes {
        clean = pattern.replace(&clean, "").trim().to_string();
    }
    clean
}

/// Returns the usable question text from one line, truncating at the first
/// meta-commentary phrase. None when the line is meta-only, trivial, or a
/// non-question statement.
fn candidate_question(line: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();

    let cut = META_PHRASES.iter().filter_map(|p| lower.find(p)).min();
    let kept = match cut {
        Some(pos) => line[..pos].trim(),
        None => line,
    };

    if kept.starts_with("The ") && !kept.ends_with('?') {
        return None;
    }

    if kept.len() > MIN_QUESTION_LEN {
        Some(kept.to_string())
    } else {
        None
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .trim()
}

/// Appends `?` when the text reads as a question, `.` otherwise. Existing
/// terminal punctuation is preserved.
fn ensure_terminal_punctuation(text: &str) -> String {
    if text.ends_with('?') || text.ends_with('.') {
        return text.to_string();
    }

    let lower = text.to_lowercase();
    if INTERROGATIVE_CUES.iter().any(|cue| lower.contains(cue)) {
        format!("{text}?")
    } else {
        format!("{text}.")
    }
}
