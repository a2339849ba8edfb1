//! Answer normalization for quiz grading.
//!
//! Quiz options are short strings such as `"O(n log n)"`, `"Binary Search"` or
//! `"Dijkstra's algorithm"`. A submitted answer should match its option even
//! when the client changed casing or whitespace, but symbols carry meaning in
//! this domain (`O(n)` is not `O(n²)`, `a[i]` is not `ai`), so unlike a
//! vocabulary checker we never strip punctuation.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalize an answer string for comparison.
///
/// Applies, in order:
/// 1. Unicode NFKD decomposition (so `²` becomes `2` and `é` becomes `e` + mark)
/// 2. Removal of combining marks
/// 3. Lowercase
/// 4. Whitespace collapse and trim
pub fn normalize_answer(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a submitted answer matches the canonical one after normalization.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    let submitted = normalize_answer(submitted);
    !submitted.is_empty() && submitted == normalize_answer(correct)
}
