//! Text Normalizer — cleans raw resume/JD text before embedding or prompting.

/// Collapses runs of newlines and whitespace to single spaces and trims.
/// Never fails; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
