//! # Invoice Reconciliation Walkthrough
//!
//! This example runs the full reconciliation pipeline on an in-memory
//! catalog: item matching per invoice line, auto-accept decisions, and
//! order matching across open purchase orders.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use reconcile::{
    auto_accept_item, auto_accept_order, match_item, match_orders, AutoAcceptConfig,
    ExtractedInvoice, InventoryItem, InvoiceLineItem, MatchOptions, OrderMatchConfig, OrderStatus,
    OrderedLine, PurchaseOrder,
};

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("invalid date {year}-{month}-{day}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("📄 Invoice Reconciliation Walkthrough\n");

    // A small inventory catalog, the kind a back office would load from its
    // item master before reconciling a batch of invoices
    let inventory = vec![
        InventoryItem::new(7, "Heavy Whipping Cream")
            .with_unit_type("oz")
            .with_pack_size(32)
            .with_unit_cost(Decimal::new(14, 2))
            .with_preferred_supplier("Dairy Direct"),
        InventoryItem::new(12, "All-Purpose Flour")
            .with_unit_type("lb")
            .with_pack_size(50)
            .with_unit_cost(Decimal::new(38, 2))
            .with_supplier_code("FL-5000"),
        InventoryItem::new(19, "Olive Oil, Extra Virgin")
            .with_unit_type("l")
            .with_pack_size(3)
            .with_unit_cost(Decimal::new(783, 2)),
        InventoryItem::new(23, "Paper Towels")
            .with_unit_type("each")
            .with_pack_size(12)
            .with_unit_cost(Decimal::new(133, 2)),
    ];

    // The AI-extracted invoice under review
    let invoice = ExtractedInvoice {
        supplier_name: "Dairy Direct".to_string(),
        invoice_date: date(2026, 8, 21)?,
        total: Decimal::new(15498, 2),
        line_items: vec![
            InvoiceLineItem::new(1, "Heavy Cream 32oz", Decimal::from(6), Decimal::new(450, 2))
                .with_unit_type("case")
                .with_package_size("32oz"),
            InvoiceLineItem::new(2, "AP Flour", Decimal::from(2), Decimal::new(1899, 2))
                .with_supplier_code("FL-5000")
                .with_package_size("50 lb"),
            InvoiceLineItem::new(3, "Olive Oil EV 3L BTL", Decimal::from(4), Decimal::new(2250, 2)),
        ],
    };

    let options = MatchOptions::default().with_supplier("Dairy Direct");
    let accept = AutoAcceptConfig::default();

    // Step 1: match each invoice line against the catalog
    println!("🔍 Step 1: Item Matching");
    for line in &invoice.line_items {
        let candidates = match_item(line, &inventory, &options)?;
        println!("  Line {}: \"{}\"", line.id, line.description);
        for candidate in &candidates {
            let conversion = candidate
                .quantity_conversion
                .as_ref()
                .map(|c| format!(" [{}]", c.package_info))
                .unwrap_or_default();
            println!(
                "    → item {} at {:.3} via {:?}{}",
                candidate.inventory_item_id, candidate.confidence, candidate.method, conversion
            );
        }
        match auto_accept_item(&candidates, &accept) {
            Some(item_id) => println!("    ✅ auto-accepted item {}", item_id),
            None => println!("    👀 needs human review"),
        }
    }

    // Step 2: match the whole invoice against open purchase orders
    println!("\n🔗 Step 2: Order Matching");
    let orders = vec![
        PurchaseOrder {
            id: 501,
            order_number: "PO-2026-0501".to_string(),
            supplier_name: "Dairy Direct".to_string(),
            order_date: date(2026, 8, 20)?,
            status: OrderStatus::Sent,
            total_amount: Decimal::new(15300, 2),
            lines: vec![
                OrderedLine {
                    inventory_item_id: 7,
                    quantity: Decimal::from(6),
                    unit_cost: Decimal::new(14, 2),
                },
                OrderedLine {
                    inventory_item_id: 12,
                    quantity: Decimal::from(2),
                    unit_cost: Decimal::new(38, 2),
                },
                OrderedLine {
                    inventory_item_id: 19,
                    quantity: Decimal::from(4),
                    unit_cost: Decimal::new(783, 2),
                },
            ],
        },
        PurchaseOrder {
            id: 502,
            order_number: "PO-2026-0446".to_string(),
            supplier_name: "Dairy Direct".to_string(),
            order_date: date(2026, 7, 2)?,
            status: OrderStatus::Received,
            total_amount: Decimal::new(9000, 2),
            lines: vec![],
        },
    ];

    let matches = match_orders(
        &invoice,
        &inventory,
        &orders,
        &options,
        &OrderMatchConfig::default(),
    )?;
    for m in &matches {
        println!(
            "  Order {}: confidence {:.3} ({} of {} lines matched)",
            m.purchase_order_id, m.confidence, m.matched_line_items, m.total_line_items
        );
        for reason in &m.match_reasons {
            println!("    • {}", reason);
        }
        println!(
            "    quantity variance {}, amount variance {}",
            m.quantity_variance, m.amount_variance
        );
    }

    match auto_accept_order(&matches, &accept) {
        Some(order_id) => println!("\n✅ Linked invoice to order {} pending confirmation", order_id),
        None => println!("\n👀 Order link needs human review"),
    }

    Ok(())
}
