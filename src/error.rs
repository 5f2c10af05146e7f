//! # Engine Error Types
//!
//! Errors raised by the reconciliation engine's entry points. These cover
//! caller contract violations only (bugs in the surrounding system, not messy
//! invoice data). Messy real-world input never produces an error: unparseable
//! package text or missing quantities degrade to "no conversion" and lower
//! confidence instead.

/// Caller contract violations detected at engine entry points
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// A line item carried a negative quantity or unit price
    NegativeAmount { line_item_id: i64, field: &'static str },
    /// The candidate list contained the same id more than once
    DuplicateCandidateId(i64),
    /// An inventory item declared a pack size of zero
    InvalidPackSize { item_id: i64 },
    /// A threshold or weight was outside its valid range
    InvalidConfig(String),
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::NegativeAmount { line_item_id, field } => {
                write!(f, "Line item {line_item_id} has a negative {field}")
            }
            ReconcileError::DuplicateCandidateId(id) => {
                write!(f, "Candidate list contains duplicate id {id}")
            }
            ReconcileError::InvalidPackSize { item_id } => {
                write!(f, "Inventory item {item_id} has a pack size of zero")
            }
            ReconcileError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ReconcileError {}
