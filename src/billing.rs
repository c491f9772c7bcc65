use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{Customer, LineItem};
use crate::pricing::Catalog;

/// Ceiling to a whole number when `round` is set, otherwise two decimals.
pub fn format_price(price: f64, round: bool) -> String {
    if round {
        let ceiled = price.ceil();
        // ceil(-0.4) is -0.0, which would print as "-0"
        let ceiled = if ceiled == 0.0 { 0.0 } else { ceiled };
        format!("{:.0}", ceiled)
    } else {
        // ties go away from zero on the exact binary value, e.g. 2.625 -> 2.63
        match Decimal::from_f64_retain(price) {
            Some(exact) => {
                let cents = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                format!("{:.2}", cents)
            }
            None => format!("{:.2}", price),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub item: LineItem,
    pub price: f64,
}

/// Every number that goes on a bill. All amounts are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct BillSummary {
    pub items: Vec<PricedItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub tax_percent: f64,
    pub total: f64,
}

impl BillSummary {
    pub fn tax_amount(&self) -> f64 {
        self.total - (self.subtotal - self.discount)
    }
}

/// Tax is charged on the amount left after the discount.
pub fn apply_adjustments(subtotal: f64, discount: f64, tax_percent: f64) -> f64 {
    let mut total = subtotal - discount;
    total += total * tax_percent / 100.0;
    total
}

pub fn summarize(customer: &Customer, catalog: &Catalog) -> BillSummary {
    let items: Vec<PricedItem> = customer
        .items
        .values()
        .map(|item| PricedItem {
            price: catalog.calculate_price(&item.job_type, item.pages, item.sets()),
            item: item.clone(),
        })
        .collect();

    let subtotal = items.iter().map(|i| i.price).sum();
    let discount = customer.adjustments.discount();
    let tax_percent = customer.adjustments.tax_percent();

    BillSummary {
        total: apply_adjustments(subtotal, discount, tax_percent),
        items,
        subtotal,
        discount,
        tax_percent,
    }
}

pub fn generate_bill_text(customer: &Customer, catalog: &Catalog, currency: &str) -> String {
    let summary = summarize(customer, catalog);
    let round_items = customer.adjustments.round_individual;

    let items_text = summary
        .items
        .iter()
        .map(|p| {
            format!(
                "{} ({}, {} pages, {} sets): {}{}",
                p.item.name,
                p.item.job_type,
                p.item.pages,
                p.item.sets(),
                currency,
                format_price(p.price, round_items)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Customer: {}\n\n{}\n\nDiscount: {}{}\nTax: {}%\nTotal: {}{}",
        customer.name,
        items_text,
        currency,
        summary.discount,
        summary.tax_percent,
        currency,
        format_price(summary.total, customer.adjustments.round_total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::default_presets;

    fn catalog() -> Catalog {
        Catalog::from_presets(default_presets()).unwrap()
    }

    fn sample_customer() -> Customer {
        let mut c = Customer::new("Customer 1");
        c.items.insert(LineItem::new("Notes", "A4 B/W", 5).with_sets(2));
        c.items.insert(LineItem::new("Poster", "A3 Color", 7));
        c.adjustments.discount = Some(5.0);
        c.adjustments.tax_percent = Some(10.0);
        c
    }

    #[test]
    fn test_format_price_two_decimals() {
        assert_eq!(format_price(10.256, false), "10.26");
        assert_eq!(format_price(10.0, false), "10.00");
    }

    #[test]
    fn test_format_price_ties_round_up() {
        assert_eq!(format_price(2.625, false), "2.63");
        assert_eq!(format_price(0.125, false), "0.13");
        assert_eq!(format_price(0.375, false), "0.38");
        assert_eq!(format_price(-2.625, false), "-2.63");
    }

    #[test]
    fn test_format_price_below_tie_rounds_down() {
        // 1.005 is stored as 1.00499999..., so it is not a tie
        assert_eq!(format_price(1.005, false), "1.00");
        assert_eq!(format_price(-7.5, false), "-7.50");
    }

    #[test]
    fn test_taxed_tie_total_in_bill() {
        let mut c = Catalog::new();
        c.add(crate::model::PricingPreset::new("Lamination", std::num::NonZeroU32::MIN, 2.5))
            .unwrap();
        let mut customer = Customer::new("C");
        customer.items.insert(LineItem::new("Card", "Lamination", 1));
        customer.adjustments.tax_percent = Some(5.0);

        assert_eq!(summarize(&customer, &c).total, 2.625);
        assert!(generate_bill_text(&customer, &c, "₹").ends_with("Total: ₹2.63"));
    }

    #[test]
    fn test_format_price_ceil() {
        assert_eq!(format_price(10.256, true), "11");
        assert_eq!(format_price(10.0, true), "10");
        assert_eq!(format_price(-0.4, true), "0");
    }

    #[test]
    fn test_tax_after_discount() {
        assert_eq!(apply_adjustments(80.0, 5.0, 10.0), 82.5);
        assert_eq!(apply_adjustments(80.0, 0.0, 0.0), 80.0);
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(&sample_customer(), &catalog());
        let prices: Vec<f64> = summary.items.iter().map(|i| i.price).collect();
        assert_eq!(prices, vec![10.0, 70.0]);
        assert_eq!(summary.subtotal, 80.0);
        assert_eq!(summary.total, 82.5);
        assert_eq!(summary.tax_amount(), 7.5);
        assert_eq!(format_price(summary.total, true), "83");
    }

    #[test]
    fn test_bill_text_template() {
        let text = generate_bill_text(&sample_customer(), &catalog(), "₹");
        let expected = "Customer: Customer 1\n\n\
            Notes (A4 B/W, 5 pages, 2 sets): ₹10.00\n\
            Poster (A3 Color, 7 pages, 1 sets): ₹70.00\n\n\
            Discount: ₹5\n\
            Tax: 10%\n\
            Total: ₹82.50";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_rounding_flags_are_independent() {
        let mut customer = sample_customer();
        customer.items.clear();
        customer.items.insert(LineItem::new("Half", "A4 B/W", 1));
        customer.adjustments = Default::default();
        customer.adjustments.tax_percent = Some(25.0);
        customer.adjustments.round_individual = true;

        // item 1.00 shown as 1, total 1.25 shown exact
        let text = generate_bill_text(&customer, &catalog(), "Rs.");
        assert!(text.contains("Half (A4 B/W, 1 pages, 1 sets): Rs.1\n"));
        assert!(text.ends_with("Total: Rs.1.25"));
        assert!(text.contains("Discount: Rs.0\n"));
    }

    #[test]
    fn test_total_rounds_from_unrounded_sum() {
        let mut customer = Customer::new("C");
        let mut c = Catalog::new();
        c.add(crate::model::PricingPreset::new(
            "Cheap",
            std::num::NonZeroU32::MIN,
            0.4,
        ))
        .unwrap();
        customer.items.insert(LineItem::new("a", "Cheap", 1));
        customer.items.insert(LineItem::new("b", "Cheap", 1));
        customer.adjustments.round_individual = true;
        customer.adjustments.round_total = true;

        // each item displays as 1, but the total is ceil(0.8) = 1, not 2
        let text = generate_bill_text(&customer, &c, "$");
        assert!(text.contains("a (Cheap, 1 pages, 1 sets): $1\n"));
        assert!(text.ends_with("Total: $1"));
    }

    #[test]
    fn test_bill_text_is_idempotent() {
        let customer = sample_customer();
        let c = catalog();
        assert_eq!(
            generate_bill_text(&customer, &c, "₹"),
            generate_bill_text(&customer, &c, "₹")
        );
    }

    #[test]
    fn test_unknown_type_in_bill() {
        let mut customer = Customer::new("C");
        customer.items.insert(LineItem::new("Mystery", "Unknown", 10));
        let summary = summarize(&customer, &catalog());
        assert_eq!(summary.total, 0.0);
    }

    #[test]
    fn test_empty_customer_bill() {
        let text = generate_bill_text(&Customer::new("Empty"), &catalog(), "₹");
        assert_eq!(text, "Customer: Empty\n\n\n\nDiscount: ₹0\nTax: 0%\nTotal: ₹0.00");
    }
}
