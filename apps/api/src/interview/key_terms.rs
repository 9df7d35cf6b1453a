//! Key-Term Extractor — pulls a bounded set of skill/technology terms out of
//! free text using a fixed vocabulary, plus a years-of-experience pattern.
//! Deterministic, no LLM calls.

use std::sync::LazyLock;

use regex::Regex;

/// Fixed vocabulary of technology and process terms, matched by
/// case-insensitive substring containment.
const TECH_VOCABULARY: [&str; 35] = [
    "javascript",
    "react",
    "node",
    "python",
    "aws",
    "docker",
    "api",
    "sql",
    "git",
    "html",
    "css",
    "angular",
    "vue",
    "express",
    "mongodb",
    "postgresql",
    "kubernetes",
    "ci/cd",
    "devops",
    "agile",
    "scrum",
    "java",
    "c++",
    "golang",
    "rust",
    "typescript",
    "redux",
    "graphql",
    "rest",
    "microservices",
    "redis",
    "elasticsearch",
    "terraform",
    "jenkins",
    "algorithms",
];

static YEARS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(years?|yrs?)").expect("valid years pattern"));

/// Extracts recognized terms in first-seen vocabulary order, deduplicated.
/// A "<N> years experience" synthetic term is appended when the text carries
/// a numeric experience mention.
pub fn extract_terms(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();

    let mut terms: Vec<String> = TECH_VOCABULARY
        .iter()
        .filter(|term| text_lower.contains(*term))
        .map(|term| term.to_string())
        .collect();

    if let Some(caps) = YEARS_PATTERN.captures(text) {
        terms.push(format!("{} years experience", &caps[1]));
    }

    terms.dedup();
    terms
}

/// Terms in `a` that overlap some term in `b` — case-insensitive substring
/// containment, tested in both directions.
pub fn matching_terms(a: &[String], b: &[String]) -> Vec<String> {
    a.iter()
        .filter(|term| b.iter().any(|other| overlaps(term, other)))
        .cloned()
        .collect()
}

/// Terms in `b` with no overlap in `a` — the gaps between the candidate's
/// background and the job requirements.
pub fn gap_terms(a: &[String], b: &[String]) -> Vec<String> {
    b.iter()
        .filter(|term| !a.iter().any(|other| overlaps(term, other)))
        .cloned()
        .collect()
}

fn overlaps(x: &str, y: &str) -> bool {
    let x = x.to_lowercase();
    let y = y.to_lowercase();
    x.contains(&y) || y.contains(&x)
}
