#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use reconcile::config::{AutoAcceptConfig, MatchOptions, OrderMatchConfig};
    use reconcile::model::{
        ExtractedInvoice, InventoryItem, InvoiceLineItem, OrderStatus, OrderedLine, PurchaseOrder,
    };
    use reconcile::order_match::match_orders;
    use reconcile::policy::auto_accept_order;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog() -> Vec<InventoryItem> {
        vec![
            InventoryItem::new(1, "Heavy Whipping Cream"),
            InventoryItem::new(2, "Unsalted Butter"),
            InventoryItem::new(3, "Whole Milk"),
            InventoryItem::new(4, "Cheddar Cheese Block"),
            InventoryItem::new(5, "Greek Yogurt"),
        ]
    }

    /// Five-line dairy invoice totalling $482.50
    fn invoice() -> ExtractedInvoice {
        ExtractedInvoice {
            supplier_name: "Valley Dairy".to_string(),
            invoice_date: date(2024, 3, 10),
            total: dec!(482.50),
            line_items: vec![
                InvoiceLineItem::new(1, "Heavy Whipping Cream", dec!(6), dec!(12.50)),
                InvoiceLineItem::new(2, "Unsalted Butter", dec!(10), dec!(8.00)),
                InvoiceLineItem::new(3, "Whole Milk", dec!(20), dec!(4.25)),
                InvoiceLineItem::new(4, "Cheddar Cheese Block", dec!(5), dec!(28.00)),
                InvoiceLineItem::new(5, "Greek Yogurt", dec!(15), dec!(6.50)),
            ],
        }
    }

    fn line(item_id: i64, quantity: rust_decimal::Decimal) -> OrderedLine {
        OrderedLine {
            inventory_item_id: item_id,
            quantity,
            unit_cost: dec!(1.00),
        }
    }

    /// Placed the day before the invoice, $480.00, carrying four of the five
    /// invoice items
    fn order_a() -> PurchaseOrder {
        PurchaseOrder {
            id: 101,
            order_number: "PO-101".to_string(),
            supplier_name: "Valley Dairy".to_string(),
            order_date: date(2024, 3, 9),
            status: OrderStatus::Sent,
            total_amount: dec!(480.00),
            lines: vec![
                line(1, dec!(6)),
                line(2, dec!(10)),
                line(3, dec!(20)),
                line(4, dec!(5)),
            ],
        }
    }

    /// Stale order from five weeks earlier with double the total and only
    /// one overlapping item
    fn order_b() -> PurchaseOrder {
        PurchaseOrder {
            id: 102,
            order_number: "PO-102".to_string(),
            supplier_name: "Valley Dairy".to_string(),
            order_date: date(2024, 2, 1),
            status: OrderStatus::Confirmed,
            total_amount: dec!(1000.00),
            lines: vec![line(3, dec!(40))],
        }
    }

    #[test]
    fn test_close_order_ranked_far_above_stale_one() {
        let matches = match_orders(
            &invoice(),
            &catalog(),
            &[order_b(), order_a()],
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].purchase_order_id, 101);
        assert!(matches[0].confidence > 0.85, "got {}", matches[0].confidence);
        assert!(matches[1].confidence < 0.3, "got {}", matches[1].confidence);
    }

    #[test]
    fn test_reasons_and_variances_for_close_order() {
        let matches = match_orders(
            &invoice(),
            &catalog(),
            &[order_a()],
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();

        let top = &matches[0];
        assert!(top
            .match_reasons
            .iter()
            .any(|r| r == "order placed 1 day(s) earlier"));
        assert!(top.match_reasons.iter().any(|r| r == "amount within 2%"));
        assert!(top
            .match_reasons
            .iter()
            .any(|r| r == "4/5 invoice items on order"));
        assert_eq!(top.matched_line_items, 4);
        assert_eq!(top.total_line_items, 5);

        // Ordered quantities equal invoiced on all four shared lines
        assert_eq!(top.quantity_variance, dec!(0));
        // Order total minus invoice total, exact decimal arithmetic
        assert_eq!(top.amount_variance, dec!(-2.50));
    }

    #[test]
    fn test_clear_winner_auto_accepted() {
        let matches = match_orders(
            &invoice(),
            &catalog(),
            &[order_a(), order_b()],
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();

        let accepted = auto_accept_order(&matches, &AutoAcceptConfig::default());
        assert_eq!(accepted, Some(101));
    }

    #[test]
    fn test_near_tied_orders_block_auto_accept() {
        // Two copies of the strong order differing only in id score within
        // the ambiguity window of each other
        let mut twin = order_a();
        twin.id = 103;
        twin.order_number = "PO-103".to_string();

        let matches = match_orders(
            &invoice(),
            &catalog(),
            &[order_a(), twin],
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();

        assert_eq!(matches[0].purchase_order_id, 101); // id breaks the tie
        assert!(auto_accept_order(&matches, &AutoAcceptConfig::default()).is_none());
    }

    #[test]
    fn test_ranking_reproducible_across_calls() {
        let orders = [order_a(), order_b()];
        let first = match_orders(
            &invoice(),
            &catalog(),
            &orders,
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();
        let second = match_orders(
            &invoice(),
            &catalog(),
            &orders,
            &MatchOptions::default(),
            &OrderMatchConfig::default(),
        )
        .unwrap();
        assert_eq!(first, second);
    }
}
