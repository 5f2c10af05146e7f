//! # Order Matcher
//!
//! Scores a whole extracted invoice against candidate purchase orders,
//! pre-filtered by the caller to the same supplier, open status, and a
//! recent window, and returns a ranked list. Three independently normalized signals combine
//! into the confidence:
//!
//! - **Date proximity**: 1.0 at a zero-day gap, decaying linearly to 0 at
//!   the edge of the candidate window
//! - **Amount similarity**: 1.0 on equal totals, decaying with the relative
//!   difference; beyond the configured tolerance the signal reads 0 without
//!   excluding the order
//! - **Item overlap**: the fraction of invoice lines whose best item-match
//!   suggestion appears among the order's lines, weighted by how much of the
//!   order those lines cover
//!
//! The combined confidence is a documented weighted sum (0.3/0.3/0.4 by
//! default) clamped to [0, 1]. Signed quantity and amount variances
//! (ordered minus invoiced) let reviewers spot over- or under-delivery at a
//! glance. Pure function: inputs are never mutated and every call returns a
//! fresh list.

use log::{debug, trace};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::config::{MatchOptions, OrderMatchConfig};
use crate::error::ReconcileError;
use crate::item_match::{match_item, validate_line_item, TIE_EPSILON};
use crate::model::{ExtractedInvoice, InventoryItem, OrderMatch, PurchaseOrder};

/// Relative amount difference treated as "close enough to call out" in the
/// match reasons
const AMOUNT_CALLOUT_THRESHOLD: f64 = 0.02;

/// Sub-weights inside the overlap signal. The invoice-side fraction
/// dominates; order-line coverage keeps a tiny order from claiming a big
/// invoice. Must sum to 1 so the overlap signal stays in [0, 1].
const INVOICE_FRACTION_WEIGHT: f64 = 0.7;
const ORDER_COVERAGE_WEIGHT: f64 = 0.3;

/// Match an extracted invoice against candidate purchase orders
///
/// # Arguments
///
/// * `invoice` - Supplier name, date, total, and extracted line items
/// * `inventory` - Catalog snapshot used to resolve each line's best item
///   suggestion for the overlap signal
/// * `orders` - Candidate orders, pre-filtered to the supplier and window;
///   non-open orders are skipped defensively
/// * `options` - Item-matcher options used for the per-line suggestions
/// * `config` - Signal weights, candidate window, and amount tolerance
///
/// # Returns
///
/// `OrderMatch` records sorted non-increasing by confidence; equal-signal
/// orders come out in ascending order-id for determinism. An empty candidate
/// set yields an empty list, not an error.
pub fn match_orders(
    invoice: &ExtractedInvoice,
    inventory: &[InventoryItem],
    orders: &[PurchaseOrder],
    options: &MatchOptions,
    config: &OrderMatchConfig,
) -> Result<Vec<OrderMatch>, ReconcileError> {
    let (date_weight, amount_weight, overlap_weight) = config.normalized_weights()?;
    options.validate()?;
    validate_invoice(invoice)?;
    validate_orders(orders)?;

    debug!(
        "Matching invoice from '{}' ({}, total {}) against {} candidate orders",
        invoice.supplier_name,
        invoice.invoice_date,
        invoice.total,
        orders.len()
    );

    // Resolve each line's best catalog suggestion once; the overlap signal
    // reuses these across every candidate order
    let mut best_match_ids: Vec<Option<i64>> = Vec::with_capacity(invoice.line_items.len());
    for line in &invoice.line_items {
        let suggestions = match_item(line, inventory, options)?;
        best_match_ids.push(suggestions.first().map(|c| c.inventory_item_id));
    }

    let mut matches: Vec<OrderMatch> = orders
        .iter()
        .filter(|order| {
            if order.status.is_open() {
                true
            } else {
                trace!("Skipping order {} with closed status", order.id);
                false
            }
        })
        .map(|order| score_order(invoice, &best_match_ids, order, config, (date_weight, amount_weight, overlap_weight)))
        .collect();

    matches.sort_by(compare_matches);

    debug!("Invoice produced {} order matches", matches.len());
    Ok(matches)
}

fn validate_invoice(invoice: &ExtractedInvoice) -> Result<(), ReconcileError> {
    let mut seen = HashSet::with_capacity(invoice.line_items.len());
    for line in &invoice.line_items {
        validate_line_item(line)?;
        if !seen.insert(line.id) {
            return Err(ReconcileError::DuplicateCandidateId(line.id));
        }
    }
    Ok(())
}

fn validate_orders(orders: &[PurchaseOrder]) -> Result<(), ReconcileError> {
    let mut seen = HashSet::with_capacity(orders.len());
    for order in orders {
        if !seen.insert(order.id) {
            return Err(ReconcileError::DuplicateCandidateId(order.id));
        }
    }
    Ok(())
}

fn score_order(
    invoice: &ExtractedInvoice,
    best_match_ids: &[Option<i64>],
    order: &PurchaseOrder,
    config: &OrderMatchConfig,
    (date_weight, amount_weight, overlap_weight): (f64, f64, f64),
) -> OrderMatch {
    let mut reasons = Vec::new();

    // Date proximity
    let day_gap = invoice
        .invoice_date
        .signed_duration_since(order.order_date)
        .num_days();
    let date_score =
        (1.0 - day_gap.abs() as f64 / config.candidate_window_days as f64).clamp(0.0, 1.0);
    if day_gap == 0 {
        reasons.push("same-day order".to_string());
    } else if date_score > 0.0 {
        let direction = if day_gap > 0 { "earlier" } else { "later" };
        let days = day_gap.abs();
        reasons.push(format!("order placed {days} day(s) {direction}"));
    }

    // Amount similarity
    let (amount_score, relative_diff) = amount_similarity(invoice.total, order.total_amount, config);
    if relative_diff == 0.0 {
        reasons.push("amount matches exactly".to_string());
    } else if relative_diff <= AMOUNT_CALLOUT_THRESHOLD {
        reasons.push("amount within 2%".to_string());
    } else if amount_score > 0.0 {
        reasons.push(format!("amount within {:.0}%", (relative_diff * 100.0).ceil()));
    }

    // Item overlap
    let order_item_ids: HashSet<i64> = order.lines.iter().map(|l| l.inventory_item_id).collect();
    let matched_ids: HashSet<i64> = best_match_ids
        .iter()
        .flatten()
        .copied()
        .filter(|id| order_item_ids.contains(id))
        .collect();
    let matched_line_items = best_match_ids
        .iter()
        .filter(|best| best.is_some_and(|id| order_item_ids.contains(&id)))
        .count();
    let total_line_items = invoice.line_items.len();

    let invoice_fraction = if total_line_items > 0 {
        matched_line_items as f64 / total_line_items as f64
    } else {
        0.0
    };
    let coverage = if order.lines.is_empty() {
        0.0
    } else {
        let covered = order
            .lines
            .iter()
            .filter(|l| matched_ids.contains(&l.inventory_item_id))
            .count();
        covered as f64 / order.lines.len() as f64
    };
    let overlap_score =
        INVOICE_FRACTION_WEIGHT * invoice_fraction + ORDER_COVERAGE_WEIGHT * coverage;
    if matched_line_items > 0 {
        reasons.push(format!(
            "{matched_line_items}/{total_line_items} invoice items on order"
        ));
    }

    let confidence = (date_weight * date_score
        + amount_weight * amount_score
        + overlap_weight * overlap_score)
        .clamp(0.0, 1.0);

    // Signed aggregates, ordered minus invoiced
    let ordered_qty_by_item: HashMap<i64, Decimal> =
        order.lines.iter().fold(HashMap::new(), |mut acc, l| {
            *acc.entry(l.inventory_item_id).or_insert(Decimal::ZERO) += l.quantity;
            acc
        });
    let mut quantity_variance = Decimal::ZERO;
    for (line, best) in invoice.line_items.iter().zip(best_match_ids) {
        if let Some(id) = best {
            if let Some(ordered) = ordered_qty_by_item.get(id) {
                quantity_variance += *ordered - line.quantity;
            }
        }
    }
    let amount_variance = order.total_amount - invoice.total;

    trace!(
        "Order {}: date {date_score:.3}, amount {amount_score:.3}, overlap {overlap_score:.3} -> confidence {confidence:.3}",
        order.id
    );

    OrderMatch {
        purchase_order_id: order.id,
        confidence,
        match_reasons: reasons,
        quantity_variance,
        amount_variance,
        matched_line_items,
        total_line_items,
    }
}

/// Amount signal in [0, 1] plus the relative difference that produced it
fn amount_similarity(
    invoice_total: Decimal,
    order_total: Decimal,
    config: &OrderMatchConfig,
) -> (f64, f64) {
    if invoice_total == Decimal::ZERO {
        let score = if order_total == Decimal::ZERO { 1.0 } else { 0.0 };
        return (score, if score == 1.0 { 0.0 } else { f64::INFINITY });
    }
    let relative = ((order_total - invoice_total).abs() / invoice_total.abs())
        .to_f64()
        .unwrap_or(f64::INFINITY);
    let score = (1.0 - relative / config.amount_tolerance).clamp(0.0, 1.0);
    (score, relative)
}

/// Descending confidence; within epsilon, ascending order id
fn compare_matches(a: &OrderMatch, b: &OrderMatch) -> Ordering {
    if (a.confidence - b.confidence).abs() > TIE_EPSILON {
        return b
            .confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal);
    }
    a.purchase_order_id.cmp(&b.purchase_order_id)
}
