//! # Invoice Reconciliation Engine
//!
//! Matches AI-extracted supplier invoice lines to catalog inventory items
//! and whole invoices to open purchase orders, producing ranked suggestions
//! with deterministic confidence scores and human-readable reasons.
//!
//! All matching is pure: functions take extracted invoice data and catalog
//! snapshots as arguments and never touch a database, the clock, or the
//! network, so every result is reproducible from its inputs.

pub mod config;
pub mod error;
pub mod item_match;
pub mod model;
pub mod normalize;
pub mod order_match;
pub mod package_size;
pub mod policy;
pub mod similarity;

pub use config::{AutoAcceptConfig, MatchOptions, OrderMatchConfig};
pub use error::ReconcileError;
pub use item_match::match_item;
pub use model::{
    ExtractedInvoice, InventoryItem, InvoiceLineItem, MatchCandidate, MatchMethod, OrderMatch,
    OrderStatus, OrderedLine, PurchaseOrder, QuantityConversion,
};
pub use order_match::match_orders;
pub use policy::{auto_accept_item, auto_accept_order};
