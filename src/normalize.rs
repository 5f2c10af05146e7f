//! # Text Normalizer
//!
//! Supplier invoices spell the same catalog item a dozen ways: "BTL", "btl.",
//! "Bottle (24ct)", "$12 CASE". Every matcher in the engine compares text
//! through this module so those spellings collapse to one canonical form.
//!
//! ## Features
//!
//! - Lower-casing and whitespace collapsing
//! - Trailing parenthesised packaging annotations stripped
//! - Currency symbols and semantically-empty punctuation removed
//! - Fixed dictionary of supplier abbreviations expanded (btl -> bottle,
//!   cs -> case, gal -> gallon, ...)
//!
//! Normalization is total and idempotent: it never fails, always returns a
//! string (empty for empty/whitespace input), and re-normalizing an already
//! normalized string is a no-op.
//!
//! ## Usage
//!
//! ```rust
//! use reconcile::normalize::normalize;
//!
//! assert_eq!(normalize("  CASE of 12 BTL "), "case of 12 bottle");
//! assert_eq!(normalize("Heavy Cream (Qt. Carton)"), "heavy cream");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Trailing "(...)": packaging annotations like "(24 ct)" or "(frozen)"
    static ref TRAILING_PARENTHETICAL: Regex =
        Regex::new(r"\s*\([^()]*\)\s*$").expect("trailing parenthetical pattern should be valid");

    /// Anything that is not a letter, digit, slash, hyphen, or whitespace
    /// carries no matching signal and becomes a space
    static ref NOISE: Regex =
        Regex::new(r"[^a-z0-9/\s-]+").expect("noise pattern should be valid");
}

lazy_static! {
    /// Supplier shorthand seen on real invoices, expanded token-by-token.
    /// Expansions are never themselves keys, which keeps normalization
    /// idempotent.
    static ref ABBREVIATIONS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("btl", "bottle");
        map.insert("btls", "bottles");
        map.insert("cs", "case");
        map.insert("ea", "each");
        map.insert("pc", "piece");
        map.insert("pcs", "pieces");
        map.insert("pkg", "package");
        map.insert("pkgs", "packages");
        map.insert("doz", "dozen");
        map.insert("dz", "dozen");
        map.insert("gal", "gallon");
        map.insert("qt", "quart");
        map.insert("pt", "pint");
        map.insert("lb", "pound");
        map.insert("lbs", "pounds");
        map.insert("oz", "ounce");
        map.insert("ct", "count");
        map.insert("bx", "box");
        map.insert("w/", "with");
        map.insert("w/o", "without");
        map
    };
}

/// Normalize free text for matching
///
/// Lower-cases, strips trailing parenthesised annotations, removes currency
/// symbols and stray punctuation, expands known abbreviations, and collapses
/// whitespace. Idempotent; returns an empty string for empty or
/// whitespace-only input.
///
/// # Examples
///
/// ```rust
/// use reconcile::normalize::normalize;
///
/// assert_eq!(normalize("HVY Cream, 32 Oz."), "hvy cream 32 ounce");
/// assert_eq!(normalize(&normalize("$4.50 / EA")), normalize("$4.50 / EA"));
/// assert_eq!(normalize("   "), "");
/// ```
pub fn normalize(text: &str) -> String {
    let mut s = text.to_lowercase();

    // Strip trailing parentheticals repeatedly: "flour (25lb) (bleached)"
    loop {
        let stripped = TRAILING_PARENTHETICAL.replace(&s, "");
        if stripped == s {
            break;
        }
        s = stripped.into_owned();
    }

    let s = NOISE.replace_all(&s, " ");

    s.split_whitespace()
        .map(|token| {
            // Trim stray hyphens so "-fresh" and "fresh-" collapse; interior
            // hyphens ("all-purpose") are kept
            let token = token.trim_matches('-');
            *ABBREVIATIONS.get(token).unwrap_or(&token)
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized tokens of a string, in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Normalized tokens as a set, for overlap scoring
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Heavy   WHIPPING Cream "), "heavy whipping cream");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n "), "");
    }

    #[test]
    fn test_strips_trailing_parenthetical() {
        assert_eq!(normalize("Olive Oil (1 Gal Jug)"), "olive oil");
        assert_eq!(normalize("Flour (25lb) (bleached)"), "flour");
        // A parenthetical mid-string is punctuation-stripped, not removed
        assert_eq!(normalize("Flour (bleached) bread grade"), "flour bleached bread grade");
    }

    #[test]
    fn test_strips_currency_and_punctuation() {
        assert_eq!(normalize("$12.50 Tomatoes, crushed!"), "12 50 tomatoes crushed");
        assert_eq!(normalize("Sugar; white: fine."), "sugar white fine");
    }

    #[test]
    fn test_expands_abbreviations() {
        assert_eq!(normalize("2 BTL olive oil"), "2 bottle olive oil");
        assert_eq!(normalize("1 cs napkins"), "1 case napkins");
        assert_eq!(normalize("5 gal milk"), "5 gallon milk");
        assert_eq!(normalize("Chicken 40 lb"), "chicken 40 pound");
    }

    #[test]
    fn test_case_of_twelve_bottles() {
        let normalized = normalize("  CASE of 12 BTL ");
        assert!(normalized.contains("case"));
        assert!(normalized.contains("bottle"));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "  CASE of 12 BTL ",
            "Heavy Cream 32oz",
            "$4.50/EA Lemons (bag)",
            "$4.50 / EA",
            "Crème Fraîche!!",
            "",
            "already normalized text",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_keeps_interior_hyphens_and_slashes() {
        assert_eq!(normalize("All-Purpose Flour"), "all-purpose flour");
        assert_eq!(normalize("24/1LB Butter"), "24/1lb butter");
    }

    #[test]
    fn test_tokenize_and_token_set() {
        let tokens = tokenize("2 BTL Olive Oil");
        assert_eq!(tokens, vec!["2", "bottle", "olive", "oil"]);

        let set = token_set("oil olive OIL");
        assert_eq!(set.len(), 2);
        assert!(set.contains("olive"));
        assert!(set.contains("oil"));
    }

    #[test]
    fn test_accented_characters_become_noise() {
        // The catalog is ASCII; accented bytes carry no matching signal here
        let normalized = normalize("Crème Fraîche");
        assert_eq!(normalize(&normalized), normalized);
    }
}
