//! # Name Similarity Scoring
//!
//! The string-similarity primitive behind fuzzy item matching: a weighted
//! token-set Jaccard blended with a normalized Levenshtein ratio, computed
//! over normalized text. The blend is a documented design choice that needs
//! calibration against real supplier invoices, not an inferred policy: token
//! overlap carries most of the weight because suppliers reorder and pad words
//! ("Cream, Heavy Whipping 32oz"), while the edit-distance term separates
//! near-identical spellings the token view cannot.
//!
//! Properties: pure, symmetric, returns a score in [0, 1], 1.0 for equal
//! normalized strings, 0.0 when either side normalizes to nothing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::normalize;

/// Weight of the token-overlap component
pub const TOKEN_WEIGHT: f64 = 0.6;

/// Weight of the edit-distance component
pub const EDIT_WEIGHT: f64 = 0.4;

lazy_static! {
    /// Tokens that are measurements rather than names: bare numbers ("32"),
    /// fused number-units ("32oz", "1.5l"), and pack notations ("24/1lb")
    static ref MEASUREMENT_TOKEN: Regex =
        Regex::new(r"^\d+(?:\.\d+)?(?:[a-z]+|/\d+(?:\.\d+)?[a-z]*)?$")
            .expect("measurement token pattern should be valid");
}

/// Score how similar two free-text descriptions are, in [0, 1]
///
/// Both sides are normalized and stripped of measurement tokens ("32oz",
/// "24/1lb") so package noise does not dilute the name comparison; if a side
/// consists only of measurement tokens, the unstripped normalized text is
/// used instead.
///
/// # Examples
///
/// ```rust
/// use reconcile::similarity::name_similarity;
///
/// assert_eq!(name_similarity("Heavy Cream", "heavy cream"), 1.0);
/// assert!(name_similarity("Heavy Cream 32oz", "Heavy Whipping Cream") > 0.6);
/// assert!(name_similarity("Heavy Cream", "Paper Towels") < 0.3);
/// assert_eq!(name_similarity("", "anything"), 0.0);
/// ```
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let na = match_text(a);
    let nb = match_text(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    if na == nb {
        return 1.0;
    }

    let token_score = token_overlap(&na, &nb);
    let edit_score = strsim::normalized_levenshtein(&na, &nb);

    (TOKEN_WEIGHT * token_score + EDIT_WEIGHT * edit_score).clamp(0.0, 1.0)
}

/// Edit-distance ratio over normalized text, used as the lexical-proximity
/// tie-breaker when candidates score within epsilon of each other
pub fn lexical_proximity(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&na, &nb)
}

/// Normalized text with hyphens split and measurement tokens removed
/// (falling back to the plain normalized text when nothing else remains).
/// Splitting hyphens lets "All-Purpose Flour" meet "All Purpose Flour".
fn match_text(text: &str) -> String {
    let normalized = normalize(text).replace('-', " ");
    let filtered = normalized
        .split_whitespace()
        .filter(|token| !MEASUREMENT_TOKEN.is_match(token))
        .collect::<Vec<_>>()
        .join(" ");
    if filtered.is_empty() {
        normalized
    } else {
        filtered
    }
}

/// Length-weighted token overlap: Jaccard over the token sets averaged with
/// containment, so a name that is a strict subset of a longer one ("heavy
/// cream" vs "heavy whipping cream") still scores high
fn token_overlap(a: &str, b: &str) -> f64 {
    let ta: Vec<&str> = a.split_whitespace().collect();
    let tb: Vec<&str> = b.split_whitespace().collect();

    let weight = |tokens: &[&str]| -> f64 { tokens.iter().map(|t| t.len() as f64).sum() };

    let wa = weight(&ta);
    let wb = weight(&tb);
    if wa == 0.0 || wb == 0.0 {
        return 0.0;
    }

    let intersection: f64 = ta
        .iter()
        .filter(|t| tb.contains(*t))
        .map(|t| t.len() as f64)
        .sum();
    let union = wa + wb - intersection;

    let jaccard = intersection / union;
    let containment = intersection / wa.min(wb);

    (jaccard + containment) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(name_similarity("flour", "flour"), 1.0);
        assert_eq!(name_similarity("Heavy Cream", "heavy   cream"), 1.0);
    }

    #[test]
    fn test_symmetry() {
        let ab = name_similarity("Heavy Cream 32oz", "Heavy Whipping Cream");
        let ba = name_similarity("Heavy Whipping Cream", "Heavy Cream 32oz");
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(name_similarity("", "flour"), 0.0);
        assert_eq!(name_similarity("flour", ""), 0.0);
        assert_eq!(name_similarity("  ", "  "), 0.0);
    }

    #[test]
    fn test_subset_name_scores_above_default_threshold() {
        // Calibration case: package noise stripped, subset name still
        // lands above the default 0.6 threshold
        let score = name_similarity("Heavy Cream 32oz", "Heavy Whipping Cream");
        assert!(score > 0.6, "expected > 0.6, got {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        let score = name_similarity("Heavy Cream 32oz", "Paper Towels 12pk");
        assert!(score < 0.3, "expected < 0.3, got {score}");
    }

    #[test]
    fn test_abbreviated_forms_converge() {
        // Normalization expands btl/cs before scoring
        let score = name_similarity("Olive Oil 2 BTL", "Olive Oil Bottle");
        assert!(score > 0.8, "expected > 0.8, got {score}");
    }

    #[test]
    fn test_measurement_only_text_falls_back() {
        // Both sides are pure measurements; falls back to raw normalized text
        assert_eq!(name_similarity("32oz", "32oz"), 1.0);
        assert!(name_similarity("32oz", "24/1lb") < 1.0);
    }

    #[test]
    fn test_score_bounded() {
        for (a, b) in [
            ("Tomatoes, Crushed (Case)", "Crushed Tomatoes"),
            ("a", "completely different thing"),
            ("$5 Lemons", "Lemons"),
        ] {
            let score = name_similarity(a, b);
            assert!((0.0..=1.0).contains(&score), "{a} vs {b} gave {score}");
        }
    }

    #[test]
    fn test_hyphenated_and_spaced_spellings_converge() {
        assert_eq!(
            name_similarity("All-Purpose Flour", "All Purpose Flour"),
            1.0
        );
    }

    #[test]
    fn test_lexical_proximity_orders_spellings() {
        let close = lexical_proximity("whole milk", "whole milks");
        let far = lexical_proximity("whole milk", "almond milk");
        assert!(close > far);
    }
}
