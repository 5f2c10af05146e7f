//! # Quantity/Pack Converter
//!
//! Suppliers describe package sizes in loose notation: "24/1LB", "case of
//! 12", "12 x 32oz", "32oz", or just "24". This module parses those strings
//! with a small regex grammar and reconciles an invoice line's quantity
//! against a catalog item's pack size, producing a conversion factor
//! (inventory pack units per invoice unit) or nothing at all.
//!
//! ## Features
//!
//! - Grammar over the package notations seen on real supplier invoices
//! - Unit classification (weight / volume / count) with exact intra-family
//!   ratios (lb -> oz, kg -> g, gal -> fl oz, ...)
//! - Conflicting unit classes (weight vs. count) yield no conversion rather
//!   than a guess
//! - Total over arbitrary input: malformed text never panics, it simply
//!   yields `None`, which callers treat as "assume 1:1 and flag lower
//!   confidence"
//!
//! ## Usage
//!
//! ```rust
//! use reconcile::model::InventoryItem;
//! use reconcile::package_size::convert;
//! use rust_decimal::Decimal;
//!
//! let butter = InventoryItem::new(7, "Butter, Unsalted")
//!     .with_unit_type("lb")
//!     .with_pack_size(24);
//!
//! let conversion = convert(Decimal::from(2), None, Some("24/1LB"), &butter).unwrap();
//! assert_eq!(conversion.conversion_factor, 1.0);
//! assert_eq!(conversion.inventory_quantity, Decimal::from(2));
//!
//! assert!(convert(Decimal::from(2), None, Some("mixed pallet??"), &butter).is_none());
//! ```

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::model::{InventoryItem, QuantityConversion};

/// Broad unit category used for conflict detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Weight,
    Volume,
    Count,
}

/// Unit families that admit exact internal ratios; cross-family conversion
/// (oz -> g) is deliberately not attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitFamily {
    WeightImperial,
    WeightMetric,
    VolumeImperial,
    VolumeMetric,
    Count,
}

impl UnitFamily {
    fn class(self) -> UnitClass {
        match self {
            UnitFamily::WeightImperial | UnitFamily::WeightMetric => UnitClass::Weight,
            UnitFamily::VolumeImperial | UnitFamily::VolumeMetric => UnitClass::Volume,
            UnitFamily::Count => UnitClass::Count,
        }
    }
}

lazy_static! {
    /// Unit spellings -> (family, scale in the family's base unit).
    /// Bases: oz (imperial weight), mg (metric weight), fl oz (imperial
    /// volume), ml (metric volume), each (count).
    static ref UNITS: HashMap<&'static str, (UnitFamily, i64)> = {
        use UnitFamily::*;
        let mut map = HashMap::new();

        for alias in ["oz", "ounce", "ounces"] {
            map.insert(alias, (WeightImperial, 1));
        }
        for alias in ["lb", "lbs", "pound", "pounds"] {
            map.insert(alias, (WeightImperial, 16));
        }

        for alias in ["mg"] {
            map.insert(alias, (WeightMetric, 1));
        }
        for alias in ["g", "gram", "grams"] {
            map.insert(alias, (WeightMetric, 1_000));
        }
        for alias in ["kg", "kilogram", "kilograms"] {
            map.insert(alias, (WeightMetric, 1_000_000));
        }

        for alias in ["fl oz", "floz", "fluid ounce", "fluid ounces"] {
            map.insert(alias, (VolumeImperial, 1));
        }
        for alias in ["cup", "cups"] {
            map.insert(alias, (VolumeImperial, 8));
        }
        for alias in ["pt", "pint", "pints"] {
            map.insert(alias, (VolumeImperial, 16));
        }
        for alias in ["qt", "quart", "quarts"] {
            map.insert(alias, (VolumeImperial, 32));
        }
        for alias in ["gal", "gallon", "gallons"] {
            map.insert(alias, (VolumeImperial, 128));
        }

        for alias in ["ml", "milliliter", "milliliters", "millilitre", "millilitres"] {
            map.insert(alias, (VolumeMetric, 1));
        }
        for alias in ["cl"] {
            map.insert(alias, (VolumeMetric, 10));
        }
        for alias in ["dl"] {
            map.insert(alias, (VolumeMetric, 100));
        }
        for alias in ["l", "liter", "liters", "litre", "litres"] {
            map.insert(alias, (VolumeMetric, 1_000));
        }

        for alias in [
            "each", "ea", "unit", "units", "count", "ct", "piece", "pieces", "pc", "pcs",
            "case", "cases", "cs", "box", "boxes", "bag", "bags", "can", "cans", "bottle",
            "bottles", "btl", "jar", "jars", "pack", "packs", "package", "packages", "pkg",
            "tray", "trays", "sleeve", "sleeves", "carton", "cartons", "tub", "tubs", "loaf",
            "loaves", "bunch", "bunches",
        ] {
            map.insert(alias, (Count, 1));
        }
        for alias in ["dozen", "doz", "dz"] {
            map.insert(alias, (Count, 12));
        }

        map
    };
}

lazy_static! {
    /// "24/1LB", "6 / 5 lb"
    static ref SLASH_PATTERN: Regex =
        Regex::new(r"^(\d+)\s*/\s*(\d+(?:\.\d+)?)\s*([a-z]+(?:\s+[a-z]+)?)?$")
            .expect("slash package pattern should be valid");

    /// "case of 12", "pack of 6", "box of 24"
    static ref CASE_OF_PATTERN: Regex =
        Regex::new(r"^(?:case|pack|box|bag|carton)\s+of\s+(\d+)$")
            .expect("case-of package pattern should be valid");

    /// "12 x 32oz", "4 × 1 gal"
    static ref X_PATTERN: Regex =
        Regex::new(r"^(\d+)\s*[x×]\s*(\d+(?:\.\d+)?)\s*([a-z]+(?:\s+[a-z]+)?)?$")
            .expect("x package pattern should be valid");

    /// "32oz", "2.5 lb", "2 dozen"
    static ref SIZE_UNIT_PATTERN: Regex =
        Regex::new(r"^(\d+(?:\.\d+)?)\s*([a-z]+(?:\s+[a-z]+)?)$")
            .expect("size-unit package pattern should be valid");

    /// Bare integer: units per pack
    static ref BARE_COUNT_PATTERN: Regex =
        Regex::new(r"^\d+$").expect("bare count pattern should be valid");

    /// Package-looking fragment inside a free-text description, e.g. the
    /// "32oz" in "Heavy Cream 32oz"
    static ref PACKAGE_HINT: Regex = Regex::new(
        r"(?i)\b(\d+\s*/\s*\d+(?:\.\d+)?\s*[a-z]+|\d+\s*[x×]\s*\d+(?:\.\d+)?\s*[a-z]*|\d+(?:\.\d+)?\s*(?:fl\s*oz|oz|lb|lbs|g|kg|ml|cl|dl|l|gal|qt|pt|cup|cups|ct|pk|dozen|doz))\b"
    )
    .expect("package hint pattern should be valid");
}

/// A package-size string decomposed by the grammar
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPackage {
    /// Sub-units per invoiced unit (the 24 in "24/1LB")
    pub count: Decimal,
    /// Size of each sub-unit (the 1 in "24/1LB"), when stated
    pub size: Option<Decimal>,
    /// Unit the size is expressed in, lowercased ("lb"), when stated
    pub unit: Option<String>,
    /// Canonical human-readable rendering ("24 x 1 lb")
    pub description: String,
}

impl ParsedPackage {
    /// Declared quantity per invoiced unit in the stated unit, before any
    /// unit-ratio adjustment (count x size, with dozen-style count units
    /// already multiplied out)
    fn declared_units(&self) -> Decimal {
        let size = self.size.unwrap_or(Decimal::ONE);
        let scale = self
            .unit
            .as_deref()
            .and_then(|u| UNITS.get(u))
            .filter(|(family, _)| *family == UnitFamily::Count)
            .map(|(_, scale)| Decimal::from(*scale))
            .unwrap_or(Decimal::ONE);
        self.count * size * scale
    }
}

/// Classify a unit-type string, tolerating the same spellings the grammar
/// accepts ("oz", "Fl Oz", "cases")
pub fn classify_unit(unit: &str) -> Option<UnitClass> {
    let unit = unit.trim().to_lowercase();
    let collapsed = unit.split_whitespace().collect::<Vec<_>>().join(" ");
    UNITS.get(collapsed.as_str()).map(|(family, _)| family.class())
}

/// Parse a package-size string with the notation grammar
///
/// Recognizes `<count>/<size><unit>`, `case of <count>`, `<count> x
/// <size><unit>`, `<size><unit>`, and bare integers. Returns `None` for
/// anything else; never panics.
pub fn parse_package_size(text: &str) -> Option<ParsedPackage> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = SLASH_PATTERN.captures(&text) {
        let count: Decimal = caps[1].parse().ok()?;
        let size: Decimal = caps[2].parse().ok()?;
        let unit = caps.get(3).map(|m| m.as_str().trim().to_string());
        let description = match &unit {
            Some(u) => format!("{count} x {size} {u}"),
            None => format!("{count} x {size}"),
        };
        return positive(ParsedPackage { count, size: Some(size), unit, description });
    }

    if let Some(caps) = CASE_OF_PATTERN.captures(&text) {
        let count: Decimal = caps[1].parse().ok()?;
        return positive(ParsedPackage {
            count,
            size: None,
            unit: None,
            description: text.clone(),
        });
    }

    if let Some(caps) = X_PATTERN.captures(&text) {
        let count: Decimal = caps[1].parse().ok()?;
        let size: Decimal = caps[2].parse().ok()?;
        let unit = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .filter(|u| !u.is_empty());
        let description = match &unit {
            Some(u) => format!("{count} x {size} {u}"),
            None => format!("{count} x {size}"),
        };
        return positive(ParsedPackage { count, size: Some(size), unit, description });
    }

    if let Some(caps) = SIZE_UNIT_PATTERN.captures(&text) {
        let size: Decimal = caps[1].parse().ok()?;
        let unit = caps[2].trim().to_string();
        // Reject alphabetic tails that are not units ("2 widgets special")
        if !UNITS.contains_key(unit.as_str()) {
            return None;
        }
        let description = format!("{size} {unit}");
        return positive(ParsedPackage {
            count: Decimal::ONE,
            size: Some(size),
            unit: Some(unit),
            description,
        });
    }

    if BARE_COUNT_PATTERN.is_match(&text) {
        let count: Decimal = text.parse().ok()?;
        return positive(ParsedPackage {
            count,
            size: None,
            unit: None,
            description: format!("pack of {count}"),
        });
    }

    trace!("Package text did not match the grammar: '{text}'");
    None
}

/// Find a package-looking fragment in a free-text description, used when the
/// extraction pipeline did not populate a dedicated package-size field
pub fn extract_package_hint(description: &str) -> Option<String> {
    PACKAGE_HINT
        .find_iter(description)
        .last()
        .map(|m| m.as_str().to_string())
}

/// Reconcile an invoice line quantity against a catalog item's pack size
///
/// # Arguments
///
/// * `invoice_qty` - Quantity stated on the invoice line
/// * `invoice_unit_type` - Unit-type string from the invoice line, if any
/// * `package_size_text` - Raw package-size notation, if any
/// * `item` - The candidate catalog item
///
/// # Returns
///
/// `Some(QuantityConversion)` with a factor strictly greater than zero when
/// both sides resolve to positive, unit-compatible quantities; `None`
/// otherwise. Callers treat `None` as "assume 1:1 and flag lower
/// confidence". Never panics, whatever the input text.
pub fn convert(
    invoice_qty: Decimal,
    invoice_unit_type: Option<&str>,
    package_size_text: Option<&str>,
    item: &InventoryItem,
) -> Option<QuantityConversion> {
    if invoice_qty < Decimal::ZERO || item.pack_size == 0 {
        return None;
    }
    let pack_size = Decimal::from(item.pack_size);
    let item_class = item.unit_type.as_deref().and_then(classify_unit);

    let parsed = package_size_text.and_then(parse_package_size);

    let (units_per_line, package_info) = match parsed {
        Some(parsed) => {
            let units = units_in_item_terms(&parsed, item)?;
            (units, parsed.description)
        }
        None => {
            if package_size_text.is_some() {
                // Text was present but unparseable: only fall back to the
                // item's own pack size when the stated unit types agree
                debug!(
                    "Unparseable package text {:?} for item {}, checking unit fallback",
                    package_size_text, item.id
                );
            }
            let invoice_class = invoice_unit_type.and_then(classify_unit);
            match (invoice_class, item_class) {
                (Some(a), Some(b)) if a == b => {
                    let info = match item.unit_type.as_deref() {
                        Some(unit) => format!("pack of {} {unit}", item.pack_size),
                        None => format!("pack of {}", item.pack_size),
                    };
                    (pack_size, info)
                }
                _ => return None,
            }
        }
    };

    if units_per_line <= Decimal::ZERO {
        return None;
    }

    let factor_dec = units_per_line / pack_size;
    let conversion_factor = factor_dec.to_f64()?;
    if !(conversion_factor > 0.0) {
        return None;
    }

    trace!(
        "Converted line ({invoice_qty} x '{package_info}') against item {}: factor {conversion_factor}",
        item.id
    );

    Some(QuantityConversion {
        invoice_quantity: invoice_qty,
        inventory_quantity: invoice_qty * factor_dec,
        conversion_factor,
        package_info,
    })
}

/// Express the parsed package contents in the item's base unit, or `None`
/// when the unit classes conflict or no exact ratio exists
fn units_in_item_terms(parsed: &ParsedPackage, item: &InventoryItem) -> Option<Decimal> {
    let declared = parsed.declared_units();

    let parsed_unit = parsed.unit.as_deref().and_then(|u| {
        let collapsed = u.split_whitespace().collect::<Vec<_>>().join(" ");
        UNITS.get(collapsed.as_str()).copied()
    });
    let item_unit = item.unit_type.as_deref().and_then(|u| {
        let collapsed = u.trim().to_lowercase();
        UNITS.get(collapsed.as_str()).copied()
    });

    match (parsed_unit, item_unit) {
        // Count-denominated packages count items regardless of how the
        // catalog measures them: "case of 12" fits a 12-pack of anything
        (None, _) => Some(declared),
        (Some((family, _)), _) if family == UnitFamily::Count => Some(declared),
        (Some(_), None) => Some(declared),
        (Some((pf, ps)), Some((inf, is))) => {
            if pf != inf {
                if pf.class() == inf.class() {
                    // Same class, different family (oz vs g): no exact
                    // cross-conversion, report nothing rather than guess
                    debug!(
                        "No exact ratio between package unit {:?} and item unit {:?}",
                        parsed.unit, item.unit_type
                    );
                }
                return None;
            }
            Some(declared * Decimal::from(ps) / Decimal::from(is))
        }
    }
}

fn positive(parsed: ParsedPackage) -> Option<ParsedPackage> {
    if parsed.count <= Decimal::ZERO || parsed.size.is_some_and(|s| s <= Decimal::ZERO) {
        None
    } else {
        Some(parsed)
    }
}
