//! Similarity Engine — cosine similarity between embedding vectors plus a
//! term-overlap estimate used when either embedding came from the fallback
//! path. Pure functions, no I/O.

use crate::interview::key_terms::matching_terms;

/// Cosine similarity of two equal-length vectors, rounded to 4 decimals.
///
/// Returns 0.0 for empty or unequal-length vectors and when either norm is
/// zero — never an error or a NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    round4(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Jaccard-like overlap of two term sets, scaled into a usable score band.
///
/// The raw ratio is matching / union, then scaled ×1.5 and offset +0.1 so a
/// modest overlap still registers, capped at 0.9. Either set empty → 0.1.
pub fn text_overlap_similarity(terms_a: &[String], terms_b: &[String]) -> f64 {
    if terms_a.is_empty() || terms_b.is_empty() {
        return 0.1;
    }

    let matching = matching_terms(terms_a, terms_b).len();
    let union = terms_a.len() + terms_b.len() - matching;
    let jaccard = matching as f64 / union as f64;
    (jaccard * 1.5 + 0.1).min(0.9)
}

/// Blends embedding and text-overlap similarity.
///
/// The text estimate only participates when an embedding came from the
/// fallback path; real embeddings are trusted as-is.
pub fn blend(embedding_sim: f64, text_sim: f64, used_fallback: bool) -> f64 {
    if used_fallback {
        round4(embedding_sim * 0.7 + text_sim * 0.3)
    } else {
        round4(embedding_sim)
    }
}

/// Human-readable match quality label for a blended similarity score.
pub fn match_quality(similarity: f64) -> &'static str {
    if similarity >= 0.8 {
        "Excellent match - Strong alignment between CV and job requirements"
    } else if similarity >= 0.6 {
        "Good match - Solid alignment with some gaps to explore"
    } else if similarity >= 0.4 {
        "Moderate match - Some alignment but significant gaps to discuss"
    } else if similarity >= 0.2 {
        "Low match - Limited alignment, focus on transferable skills"
    } else {
        "Poor match - Significant misalignment, explore adaptability and learning ability"
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cosine_of_vector_with_itself_is_one() {
        let v = vec![0.3, -0.5, 0.8, 0.1];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn test_cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_of_opposite_vectors_is_negative_one() {
        let a = vec![1.0, 2.0];
        let b = vec![-1.0, -2.0];
        assert_eq!(cosine_similarity(&a, &b), -1.0);
    }

    #[test]
    fn test_cosine_unequal_lengths_returns_zero() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_empty_or_zero_norm_returns_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_rounds_to_four_decimals() {
        let a = vec![1.0, 1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        // 1/sqrt(2) = 0.70710678... → 0.7071
        assert_eq!(cosine_similarity(&a, &b), 0.7071);
    }

    #[test]
    fn test_text_overlap_empty_set_floors_at_point_one() {
        assert_eq!(text_overlap_similarity(&[], &strings(&["rust"])), 0.1);
        assert_eq!(text_overlap_similarity(&strings(&["rust"]), &[]), 0.1);
    }

    #[test]
    fn test_text_overlap_caps_at_point_nine() {
        let terms = strings(&["rust", "react", "aws"]);
        // full overlap: jaccard 1.0 → 1.6 before cap
        assert_eq!(text_overlap_similarity(&terms, &terms), 0.9);
    }

    #[test]
    fn test_text_overlap_partial() {
        let a = strings(&["rust", "react"]);
        let b = strings(&["react", "aws"]);
        // 1 match, union 3: jaccard 1/3 → 0.5 + 0.1
        let score = text_overlap_similarity(&a, &b);
        assert!((score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_blend_ignores_text_sim_without_fallback() {
        assert_eq!(blend(0.82, 0.1, false), 0.82);
        assert_eq!(blend(0.82, 0.9, false), 0.82);
    }

    #[test]
    fn test_blend_weights_seventy_thirty_with_fallback() {
        // 0.7*0.5 + 0.3*0.9 = 0.62
        assert_eq!(blend(0.5, 0.9, true), 0.62);
    }

    #[test]
    fn test_match_quality_bands() {
        assert!(match_quality(0.85).starts_with("Excellent"));
        assert!(match_quality(0.65).starts_with("Good"));
        assert!(match_quality(0.45).starts_with("Moderate"));
        assert!(match_quality(0.25).starts_with("Low"));
        assert!(match_quality(0.05).starts_with("Poor"));
    }
}
