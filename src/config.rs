//! # Matcher Configuration
//!
//! All tunable thresholds and weights for the reconciliation engine live
//! here, passed explicitly into each matcher call. Defaults carry the values
//! the production system runs with; nothing in the engine reads a hidden
//! global.

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

/// Options consumed by the item matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Supplier the invoice came from, used for the affinity bonus
    pub supplier_name: Option<String>,

    /// Name-similarity scores below this are dropped entirely (0..=1)
    pub fuzzy_threshold: f64,

    /// Ranked suggestions are truncated to this many
    pub max_suggestions: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            supplier_name: None,
            fuzzy_threshold: 0.6,
            max_suggestions: 5,
        }
    }
}

impl MatchOptions {
    /// Set the supplier name used for the affinity bonus
    pub fn with_supplier(mut self, supplier: &str) -> Self {
        self.supplier_name = Some(supplier.to_string());
        self
    }

    /// Validate the option ranges, failing fast on caller bugs
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if !self.fuzzy_threshold.is_finite() || !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ReconcileError::InvalidConfig(format!(
                "fuzzy_threshold must be in [0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.max_suggestions == 0 {
            return Err(ReconcileError::InvalidConfig(
                "max_suggestions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Signal weights and windows for the order matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMatchConfig {
    /// Weight of the date-proximity signal
    pub date_weight: f64,

    /// Weight of the amount-similarity signal
    pub amount_weight: f64,

    /// Weight of the item-overlap signal
    pub overlap_weight: f64,

    /// Trailing window the candidate set was filtered to; date proximity
    /// decays to zero at its edge
    pub candidate_window_days: i64,

    /// Relative total difference beyond which the amount signal reads zero
    /// (0.25 means a 25% gap zeroes the signal without excluding the order)
    pub amount_tolerance: f64,
}

impl Default for OrderMatchConfig {
    fn default() -> Self {
        Self {
            date_weight: 0.3,
            amount_weight: 0.3,
            overlap_weight: 0.4,
            candidate_window_days: 30,
            amount_tolerance: 0.25,
        }
    }
}

impl OrderMatchConfig {
    /// Validate ranges and return the weights normalized to sum to 1, so a
    /// caller passing raw proportions still gets a confidence in [0, 1]
    pub fn normalized_weights(&self) -> Result<(f64, f64, f64), ReconcileError> {
        for (name, w) in [
            ("date_weight", self.date_weight),
            ("amount_weight", self.amount_weight),
            ("overlap_weight", self.overlap_weight),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(ReconcileError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {w}"
                )));
            }
        }
        let sum = self.date_weight + self.amount_weight + self.overlap_weight;
        if sum <= 0.0 {
            return Err(ReconcileError::InvalidConfig(
                "order-match weights must not all be zero".to_string(),
            ));
        }
        if self.candidate_window_days <= 0 {
            return Err(ReconcileError::InvalidConfig(
                "candidate_window_days must be positive".to_string(),
            ));
        }
        if !self.amount_tolerance.is_finite() || self.amount_tolerance <= 0.0 {
            return Err(ReconcileError::InvalidConfig(
                "amount_tolerance must be positive".to_string(),
            ));
        }
        Ok((
            self.date_weight / sum,
            self.amount_weight / sum,
            self.overlap_weight / sum,
        ))
    }
}

/// Thresholds for unattended acceptance of top-ranked suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAcceptConfig {
    /// Item matches silently rewrite data, so the bar is near-certainty
    pub item_threshold: f64,

    /// Order links only move the order to pending confirmation, which still
    /// gets reviewed, so the bar is lower
    pub order_threshold: f64,

    /// Tie window: a runner-up within this distance of the top candidate
    /// makes the result ambiguous and blocks auto-accept
    pub ambiguity_epsilon: f64,
}

impl Default for AutoAcceptConfig {
    fn default() -> Self {
        Self {
            item_threshold: 0.99,
            order_threshold: 0.7,
            ambiguity_epsilon: 0.005,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MatchOptions::default();
        assert_eq!(options.fuzzy_threshold, 0.6);
        assert_eq!(options.max_suggestions, 5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_fuzzy_threshold_rejected() {
        let options = MatchOptions {
            fuzzy_threshold: 1.5,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = MatchOptions {
            fuzzy_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_default_order_weights_sum_to_one() {
        let config = OrderMatchConfig::default();
        let (d, a, o) = config.normalized_weights().unwrap();
        assert!((d - 0.3).abs() < 1e-9);
        assert!((a - 0.3).abs() < 1e-9);
        assert!((o - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_raw_proportions_are_normalized() {
        let config = OrderMatchConfig {
            date_weight: 3.0,
            amount_weight: 3.0,
            overlap_weight: 4.0,
            ..Default::default()
        };
        let (d, a, o) = config.normalized_weights().unwrap();
        assert!((d + a + o - 1.0).abs() < 1e-9);
        assert!((o - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weights_rejected() {
        let config = OrderMatchConfig {
            date_weight: 0.0,
            amount_weight: 0.0,
            overlap_weight: 0.0,
            ..Default::default()
        };
        assert!(config.normalized_weights().is_err());
    }

    #[test]
    fn test_default_auto_accept_thresholds() {
        let config = AutoAcceptConfig::default();
        assert_eq!(config.item_threshold, 0.99);
        assert_eq!(config.order_threshold, 0.7);
        assert_eq!(config.ambiguity_epsilon, 0.005);
    }
}
