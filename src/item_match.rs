//! # Item Matcher
//!
//! Scores one AI-extracted invoice line item against every candidate catalog
//! inventory item and returns a ranked, confidence-scored suggestion list.
//!
//! ## Scoring pipeline
//!
//! 1. **Exact supplier code**: a code match pins confidence at 1.0 and
//!    short-circuits the fuzzy scoring, though every contributing reason is
//!    still recorded for the review screen
//! 2. **Name similarity**: normalized token-overlap/edit-distance hybrid;
//!    candidates below the configured fuzzy threshold are dropped
//! 3. **Supplier affinity**: small bounded bonus when the candidate's
//!    preferred supplier is the invoice's supplier
//! 4. **Unit/package compatibility**: the pack converter's result is
//!    attached when available; a hard unit-class conflict costs confidence
//!    but never eliminates a candidate, since a reviewer may still want it
//!
//! Ties within a small epsilon break on stock (higher first), then lexical
//! proximity of the normalized names, then item id, so results are fully
//! deterministic and reproducible in tests. Inputs are never mutated; every
//! call returns a freshly built list.

use log::{debug, trace};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::MatchOptions;
use crate::error::ReconcileError;
use crate::model::{InventoryItem, InvoiceLineItem, MatchCandidate, MatchMethod};
use crate::package_size::{classify_unit, convert, extract_package_hint};
use crate::similarity::{lexical_proximity, name_similarity};

/// Additive confidence bonus when the candidate's preferred supplier matches
/// the invoice's supplier; bounded so confidence never exceeds 1.0
const AFFINITY_BONUS: f64 = 0.05;

/// Confidence penalty for a hard unit-class conflict with no conversion
const UNIT_MISMATCH_PENALTY: f64 = 0.15;

/// Confidences closer than this are considered tied and fall through to the
/// deterministic tie-breakers
pub const TIE_EPSILON: f64 = 1e-6;

struct ScoredCandidate {
    candidate: MatchCandidate,
    stock: Decimal,
    proximity: f64,
}

/// Match one invoice line item against the candidate inventory
///
/// # Arguments
///
/// * `line` - The invoice line to match; never mutated
/// * `inventory` - Candidate catalog snapshot, pre-filtered by the caller
/// * `options` - Supplier name, fuzzy threshold, and suggestion cap
///
/// # Returns
///
/// Ranked candidates, sorted descending by confidence and truncated to
/// `options.max_suggestions`. An empty candidate set or a line matching
/// nothing yields an empty list, not an error. Errors indicate caller bugs
/// (negative quantities, duplicate ids), never messy invoice text.
///
/// # Examples
///
/// ```rust
/// use reconcile::config::MatchOptions;
/// use reconcile::item_match::match_item;
/// use reconcile::model::{InventoryItem, InvoiceLineItem};
/// use rust_decimal::Decimal;
///
/// let line = InvoiceLineItem::new(1, "Heavy Cream 32oz", Decimal::from(6), Decimal::from(4));
/// let catalog = vec![InventoryItem::new(10, "Heavy Whipping Cream")
///     .with_unit_type("oz")
///     .with_pack_size(32)];
///
/// let candidates = match_item(&line, &catalog, &MatchOptions::default()).unwrap();
/// assert_eq!(candidates[0].inventory_item_id, 10);
/// assert!(candidates[0].quantity_conversion.is_some());
/// ```
pub fn match_item(
    line: &InvoiceLineItem,
    inventory: &[InventoryItem],
    options: &MatchOptions,
) -> Result<Vec<MatchCandidate>, ReconcileError> {
    options.validate()?;
    validate_line_item(line)?;
    validate_inventory(inventory)?;

    debug!(
        "Matching line {} ('{}') against {} catalog items",
        line.id,
        line.description,
        inventory.len()
    );

    let mut scored: Vec<ScoredCandidate> = inventory
        .iter()
        .filter(|item| {
            if item.is_prepared() {
                trace!("Skipping prepared item {} ('{}')", item.id, item.name);
                false
            } else {
                true
            }
        })
        .filter_map(|item| score_candidate(line, item, options))
        .collect();

    scored.sort_by(compare_candidates);
    scored.truncate(options.max_suggestions);

    debug!("Line {} produced {} suggestions", line.id, scored.len());
    Ok(scored.into_iter().map(|s| s.candidate).collect())
}

/// Validate an invoice line at the engine boundary
pub fn validate_line_item(line: &InvoiceLineItem) -> Result<(), ReconcileError> {
    if line.quantity < Decimal::ZERO {
        return Err(ReconcileError::NegativeAmount {
            line_item_id: line.id,
            field: "quantity",
        });
    }
    if line.unit_price < Decimal::ZERO {
        return Err(ReconcileError::NegativeAmount {
            line_item_id: line.id,
            field: "unit price",
        });
    }
    Ok(())
}

fn validate_inventory(inventory: &[InventoryItem]) -> Result<(), ReconcileError> {
    let mut seen = HashSet::with_capacity(inventory.len());
    for item in inventory {
        if !seen.insert(item.id) {
            return Err(ReconcileError::DuplicateCandidateId(item.id));
        }
        if item.pack_size == 0 {
            return Err(ReconcileError::InvalidPackSize { item_id: item.id });
        }
    }
    Ok(())
}

fn score_candidate(
    line: &InvoiceLineItem,
    item: &InventoryItem,
    options: &MatchOptions,
) -> Option<ScoredCandidate> {
    let mut reasons = Vec::new();

    let exact_code = match (&line.supplier_item_code, &item.supplier_item_code) {
        (Some(a), Some(b)) => {
            let a = a.trim();
            let b = b.trim();
            !a.is_empty() && a.eq_ignore_ascii_case(b)
        }
        _ => false,
    };

    let similarity = name_similarity(&line.description, &item.name);

    let (mut confidence, method) = if exact_code {
        reasons.push("exact supplier code match".to_string());
        reasons.push(format!("name similarity {similarity:.2}"));
        (1.0, MatchMethod::ExactCode)
    } else {
        if similarity < options.fuzzy_threshold {
            trace!(
                "Dropping item {} for line {}: similarity {:.3} below threshold {:.3}",
                item.id,
                line.id,
                similarity,
                options.fuzzy_threshold
            );
            return None;
        }
        reasons.push(format!("name similarity {similarity:.2}"));
        (similarity, MatchMethod::NameSimilarity)
    };

    if let (Some(supplier), Some(preferred)) = (&options.supplier_name, &item.preferred_supplier) {
        if supplier.trim().eq_ignore_ascii_case(preferred.trim()) {
            confidence = (confidence + AFFINITY_BONUS).min(1.0);
            reasons.push(format!("preferred supplier '{preferred}'"));
        }
    }

    let package_text = line
        .package_size
        .clone()
        .or_else(|| extract_package_hint(&line.description));
    let conversion = convert(
        line.quantity,
        line.unit_type.as_deref(),
        package_text.as_deref(),
        item,
    );

    match &conversion {
        Some(c) => {
            reasons.push(format!(
                "package {} (factor {:.2})",
                c.package_info, c.conversion_factor
            ));
        }
        None => {
            let invoice_class = line.unit_type.as_deref().and_then(classify_unit);
            let item_class = item.unit_type.as_deref().and_then(classify_unit);
            if let (Some(a), Some(b)) = (invoice_class, item_class) {
                // Penalize but keep: a reviewer may still want the candidate
                if a != b && method != MatchMethod::ExactCode {
                    confidence = (confidence - UNIT_MISMATCH_PENALTY).max(0.0);
                    reasons.push(format!(
                        "unit type mismatch ({:?} vs {:?})",
                        a, b
                    ));
                }
            }
        }
    }

    Some(ScoredCandidate {
        proximity: lexical_proximity(&line.description, &item.name),
        stock: item.current_stock,
        candidate: MatchCandidate {
            inventory_item_id: item.id,
            confidence,
            match_reasons: reasons,
            method,
            quantity_conversion: conversion,
        },
    })
}

/// Descending confidence; within epsilon, higher stock first, then lexical
/// proximity, then ascending item id for full determinism
fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    if (a.candidate.confidence - b.candidate.confidence).abs() > TIE_EPSILON {
        return b
            .candidate
            .confidence
            .partial_cmp(&a.candidate.confidence)
            .unwrap_or(Ordering::Equal);
    }
    b.stock
        .cmp(&a.stock)
        .then_with(|| b.proximity.partial_cmp(&a.proximity).unwrap_or(Ordering::Equal))
        .then_with(|| a.candidate.inventory_item_id.cmp(&b.candidate.inventory_item_id))
}
