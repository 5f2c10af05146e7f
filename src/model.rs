//! # Reconciliation Data Model
//!
//! This module defines the value types flowing through the reconciliation
//! engine: invoice line items as produced by the extraction pipeline,
//! read-only snapshots of the inventory catalog and purchase orders, and the
//! ephemeral scored results handed back to the persistence layer.
//!
//! ## Core Concepts
//!
//! - **InvoiceLineItem**: one row of a supplier invoice (description,
//!   quantity, price), immutable for the duration of matching
//! - **InventoryItem**: a catalog snapshot the engine only reads
//! - **MatchCandidate** / **OrderMatch**: freshly constructed, ranked,
//!   confidence-scored results; the engine never owns or mutates its inputs
//!
//! ## Usage
//!
//! ```rust
//! use reconcile::model::InvoiceLineItem;
//! use rust_decimal::Decimal;
//!
//! let line = InvoiceLineItem::new(1, "Heavy Cream 32oz", Decimal::from(6), Decimal::new(425, 2))
//!     .with_supplier_code("HC-32")
//!     .with_unit_type("oz");
//!
//! assert_eq!(line.line_total(), Decimal::new(2550, 2));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of an AI-extracted supplier invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// Identifier assigned by the extraction pipeline
    pub id: i64,

    /// Free-text description as it appeared on the invoice
    pub description: String,

    /// Supplier's own item code, when the invoice carried one
    pub supplier_item_code: Option<String>,

    /// Quantity invoiced (decimal, >= 0)
    pub quantity: Decimal,

    /// Price per invoiced unit (decimal, >= 0)
    pub unit_price: Decimal,

    /// Raw package-size notation (e.g. "24/1LB", "case of 12")
    pub package_size: Option<String>,

    /// Unit-type string as extracted (e.g. "oz", "case", "each")
    pub unit_type: Option<String>,
}

/// Invoice-level metadata plus its line items, as handed over by the
/// extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Supplier name as printed on the invoice
    pub supplier_name: String,

    /// Invoice date
    pub invoice_date: NaiveDate,

    /// Invoice grand total
    pub total: Decimal,

    /// Extracted line items
    pub line_items: Vec<InvoiceLineItem>,
}

/// Read-only snapshot of a catalog inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Catalog id
    pub id: i64,

    /// Canonical item name
    pub name: String,

    /// Base unit the item is counted in (e.g. "oz", "lb", "each")
    pub unit_type: Option<String>,

    /// Base units per orderable unit (>= 1; 1 when the item is ordered loose)
    pub pack_size: u32,

    /// Cost per base unit
    pub unit_cost: Decimal,

    /// Current stock on hand, in base units
    pub current_stock: Decimal,

    /// Preferred supplier for this item, when one is configured
    pub preferred_supplier: Option<String>,

    /// Supplier's item code known for this catalog entry
    pub supplier_item_code: Option<String>,

    /// Item-type tag; "prepared" items are made in house and never matched
    /// against supplier invoices
    pub item_type: Option<String>,
}

/// How a match candidate was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Supplier item code matched a known catalog code exactly
    ExactCode,
    /// Normalized-name fuzzy similarity
    NameSimilarity,
    /// Injected by the calling layer from stored match history
    Historical,
    /// Injected by the calling layer as a manual or default suggestion
    Fallback,
}

/// Invoice quantity reconciled against a catalog item's pack size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityConversion {
    /// Quantity as stated on the invoice line
    pub invoice_quantity: Decimal,

    /// Equivalent quantity in the catalog item's orderable units
    pub inventory_quantity: Decimal,

    /// Inventory pack units per invoice unit; always > 0 when present
    pub conversion_factor: f64,

    /// Human-readable rendering of the parsed package info (e.g. "24 x 1 lb")
    pub package_info: String,
}

/// One scored inventory candidate for a single invoice line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Catalog id of the candidate inventory item
    pub inventory_item_id: i64,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Human-readable reasons, in the order they contributed
    pub match_reasons: Vec<String>,

    /// How this candidate was produced
    pub method: MatchMethod,

    /// Pack-size reconciliation, when one could be derived. Absent means the
    /// caller must not assume invoice and catalog units are identical.
    pub quantity_conversion: Option<QuantityConversion>,
}

/// Purchase-order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Sent,
    Confirmed,
    Received,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this state is still awaiting delivery and may be
    /// linked to an incoming invoice
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Sent | OrderStatus::Confirmed)
    }
}

/// One line of a previously issued purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedLine {
    /// Catalog id of the ordered item
    pub inventory_item_id: i64,

    /// Quantity ordered, in orderable units
    pub quantity: Decimal,

    /// Unit cost at order time
    pub unit_cost: Decimal,
}

/// Read-only snapshot of a purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// Order id
    pub id: i64,

    /// Human-facing order number
    pub order_number: String,

    /// Supplier the order was placed with
    pub supplier_name: String,

    /// Date the order was placed
    pub order_date: NaiveDate,

    /// Lifecycle state; only open orders are match candidates
    pub status: OrderStatus,

    /// Order grand total
    pub total_amount: Decimal,

    /// Ordered line items
    pub lines: Vec<OrderedLine>,
}

/// One scored purchase-order candidate for a whole invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMatch {
    /// Id of the candidate purchase order
    pub purchase_order_id: i64,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Signals that contributed meaningfully (e.g. "same-day order")
    pub match_reasons: Vec<String>,

    /// Signed aggregate quantity difference, ordered minus invoiced,
    /// across line items matched on both sides
    pub quantity_variance: Decimal,

    /// Signed amount difference, order total minus invoice total
    pub amount_variance: Decimal,

    /// Invoice line items whose best suggestion appears on the order
    pub matched_line_items: usize,

    /// Total invoice line items considered
    pub total_line_items: usize,
}

impl InvoiceLineItem {
    /// Create a line item with the mandatory fields
    pub fn new(id: i64, description: &str, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            id,
            description: description.to_string(),
            supplier_item_code: None,
            quantity,
            unit_price,
            package_size: None,
            unit_type: None,
        }
    }

    /// Attach the supplier's item code
    pub fn with_supplier_code(mut self, code: &str) -> Self {
        self.supplier_item_code = Some(code.to_string());
        self
    }

    /// Attach a raw package-size string
    pub fn with_package_size(mut self, package_size: &str) -> Self {
        self.package_size = Some(package_size.to_string());
        self
    }

    /// Attach a unit-type string
    pub fn with_unit_type(mut self, unit_type: &str) -> Self {
        self.unit_type = Some(unit_type.to_string());
        self
    }

    /// Derived line total (quantity x unit price). Reported for review
    /// screens; the extraction pipeline's own total is never overwritten.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

impl InventoryItem {
    /// Create a catalog snapshot with the mandatory fields and a pack size
    /// of 1 (loose)
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            unit_type: None,
            pack_size: 1,
            unit_cost: Decimal::ZERO,
            current_stock: Decimal::ZERO,
            preferred_supplier: None,
            supplier_item_code: None,
            item_type: None,
        }
    }

    /// Set the base unit type
    pub fn with_unit_type(mut self, unit_type: &str) -> Self {
        self.unit_type = Some(unit_type.to_string());
        self
    }

    /// Set the pack size (base units per orderable unit)
    pub fn with_pack_size(mut self, pack_size: u32) -> Self {
        self.pack_size = pack_size;
        self
    }

    /// Set the per-unit cost
    pub fn with_unit_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    /// Set the current stock level
    pub fn with_stock(mut self, current_stock: Decimal) -> Self {
        self.current_stock = current_stock;
        self
    }

    /// Set the preferred supplier
    pub fn with_preferred_supplier(mut self, supplier: &str) -> Self {
        self.preferred_supplier = Some(supplier.to_string());
        self
    }

    /// Set the known supplier item code
    pub fn with_supplier_code(mut self, code: &str) -> Self {
        self.supplier_item_code = Some(code.to_string());
        self
    }

    /// Set the item-type tag
    pub fn with_item_type(mut self, item_type: &str) -> Self {
        self.item_type = Some(item_type.to_string());
        self
    }

    /// Whether this item is prepared in house and excluded from supplier
    /// invoice matching
    pub fn is_prepared(&self) -> bool {
        self.item_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("prepared"))
            .unwrap_or(false)
    }
}
