//! # Auto-Accept Policy
//!
//! Thresholding rules layered on top of both matchers that decide when a
//! top-ranked suggestion may be applied without human confirmation. Kept
//! separate from the scoring math so thresholds can be tuned without
//! touching the matchers, and so the rules can be unit-tested on synthetic
//! candidate lists.
//!
//! Two rules gate acceptance:
//!
//! 1. The top candidate must clear the configured threshold (0.99 for item
//!    matches, which silently rewrite data; 0.7 for order links, which only
//!    move an order into pending confirmation for review)
//! 2. **Ambiguity guard**: if any other candidate also clears the
//!    threshold, or sits within the epsilon tie-window of the top score,
//!    nothing is accepted. Two equally strong suggestions mean the signal
//!    is not discriminative enough to trust unattended.

use log::debug;

use crate::config::AutoAcceptConfig;
use crate::model::{MatchCandidate, OrderMatch};

/// Decide whether the top item suggestion may be applied unattended
///
/// Returns the inventory item id to apply, or `None` when the confidence
/// bar is not met or the result is ambiguous. The ranked list itself is
/// always still available for human choice.
pub fn auto_accept_item(candidates: &[MatchCandidate], config: &AutoAcceptConfig) -> Option<i64> {
    let scores: Vec<f64> = candidates.iter().map(|c| c.confidence).collect();
    accept_top(&scores, config.item_threshold, config.ambiguity_epsilon)
        .map(|index| candidates[index].inventory_item_id)
}

/// Decide whether the top order match may be linked unattended (into a
/// pending-confirmation state, not silently confirmed)
pub fn auto_accept_order(matches: &[OrderMatch], config: &AutoAcceptConfig) -> Option<i64> {
    let scores: Vec<f64> = matches.iter().map(|m| m.confidence).collect();
    accept_top(&scores, config.order_threshold, config.ambiguity_epsilon)
        .map(|index| matches[index].purchase_order_id)
}

/// Core rule over raw confidences: index of the single acceptable candidate
fn accept_top(scores: &[f64], threshold: f64, epsilon: f64) -> Option<usize> {
    let (top_index, top_score) = scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

    if *top_score < threshold {
        debug!("Auto-accept refused: top score {top_score:.3} below threshold {threshold:.3}");
        return None;
    }

    let ambiguous = scores.iter().enumerate().any(|(index, score)| {
        index != top_index && (*score >= threshold || top_score - score <= epsilon)
    });
    if ambiguous {
        debug!("Auto-accept refused: near-tied candidates at {top_score:.3}");
        return None;
    }

    Some(top_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchMethod;

    fn candidate(id: i64, confidence: f64) -> MatchCandidate {
        MatchCandidate {
            inventory_item_id: id,
            confidence,
            match_reasons: vec![],
            method: MatchMethod::NameSimilarity,
            quantity_conversion: None,
        }
    }

    fn order_match(id: i64, confidence: f64) -> OrderMatch {
        OrderMatch {
            purchase_order_id: id,
            confidence,
            match_reasons: vec![],
            quantity_variance: Default::default(),
            amount_variance: Default::default(),
            matched_line_items: 0,
            total_line_items: 0,
        }
    }

    #[test]
    fn test_clear_winner_accepted() {
        let candidates = vec![candidate(1, 0.995), candidate(2, 0.4), candidate(3, 0.2)];
        let accepted = auto_accept_item(&candidates, &AutoAcceptConfig::default());
        assert_eq!(accepted, Some(1));
    }

    #[test]
    fn test_below_threshold_refused() {
        let candidates = vec![candidate(1, 0.98)];
        assert_eq!(auto_accept_item(&candidates, &AutoAcceptConfig::default()), None);
    }

    #[test]
    fn test_two_candidates_over_threshold_is_ambiguous() {
        // 0.995 and 0.991 both clear the 0.99 bar: refuse even though one
        // exceeds the other
        let candidates = vec![candidate(1, 0.995), candidate(2, 0.991)];
        assert_eq!(auto_accept_item(&candidates, &AutoAcceptConfig::default()), None);
    }

    #[test]
    fn test_runner_up_inside_epsilon_window_is_ambiguous() {
        let config = AutoAcceptConfig {
            item_threshold: 0.9,
            ambiguity_epsilon: 0.05,
            ..Default::default()
        };
        // Runner-up below the threshold but within epsilon of the top
        let candidates = vec![candidate(1, 0.92), candidate(2, 0.88)];
        assert_eq!(auto_accept_item(&candidates, &config), None);
    }

    #[test]
    fn test_empty_list_refused() {
        assert_eq!(auto_accept_item(&[], &AutoAcceptConfig::default()), None);
        assert_eq!(auto_accept_order(&[], &AutoAcceptConfig::default()), None);
    }

    #[test]
    fn test_order_threshold_is_lower() {
        let matches = vec![order_match(100, 0.75), order_match(200, 0.3)];
        let accepted = auto_accept_order(&matches, &AutoAcceptConfig::default());
        assert_eq!(accepted, Some(100));

        // The same scores would never clear the item bar
        let candidates = vec![candidate(100, 0.75), candidate(200, 0.3)];
        assert_eq!(auto_accept_item(&candidates, &AutoAcceptConfig::default()), None);
    }

    #[test]
    fn test_accepts_top_even_when_list_unsorted() {
        let candidates = vec![candidate(2, 0.4), candidate(1, 0.995)];
        assert_eq!(
            auto_accept_item(&candidates, &AutoAcceptConfig::default()),
            Some(1)
        );
    }
}
