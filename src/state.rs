use chrono::Local;
use tracing::debug;

use crate::billing::{generate_bill_text, summarize};
use crate::error::{AppError, Result};
use crate::history::{BillHistory, BillSnapshot};
use crate::model::{Customer, CustomerId, ItemId, LineItem};
use crate::pricing::Catalog;
use crate::store::Store;

/// Everything one session works on. Lives from start-up until the program exits.
#[derive(Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub customers: Store<Customer>,
    pub dark_mode: bool,
    pub currency: String,
    history: BillHistory,
}

impl AppState {
    /// Starts with a single empty "Customer 1".
    pub fn new(catalog: Catalog, currency: impl Into<String>) -> Self {
        let mut state = AppState {
            catalog,
            customers: Store::new(),
            dark_mode: false,
            currency: currency.into(),
            history: BillHistory::new(),
        };
        state.add_customer();
        state
    }

    pub fn customer(&self, id: CustomerId) -> Result<&Customer> {
        self.customers.get(id).ok_or(AppError::CustomerNotFound)
    }

    fn customer_mut(&mut self, id: CustomerId) -> Result<&mut Customer> {
        self.customers.get_mut(id).ok_or(AppError::CustomerNotFound)
    }

    // The default name counts current customers, so it can repeat after a delete.
    pub fn add_customer(&mut self) -> CustomerId {
        let name = format!("Customer {}", self.customers.len() + 1);
        debug!("Adding {}", name);
        self.customers.insert(Customer::new(name))
    }

    pub fn delete_customer(&mut self, id: CustomerId) -> Result<Customer> {
        self.customers.remove(id).ok_or(AppError::CustomerNotFound)
    }

    pub fn rename_customer(&mut self, id: CustomerId, name: impl Into<String>) -> Result<()> {
        self.customer_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_discount(&mut self, id: CustomerId, discount: Option<f64>) -> Result<()> {
        self.customer_mut(id)?.adjustments.discount = discount;
        Ok(())
    }

    pub fn set_tax(&mut self, id: CustomerId, tax_percent: Option<f64>) -> Result<()> {
        self.customer_mut(id)?.adjustments.tax_percent = tax_percent;
        Ok(())
    }

    pub fn set_round_individual(&mut self, id: CustomerId, on: bool) -> Result<()> {
        self.customer_mut(id)?.adjustments.round_individual = on;
        Ok(())
    }

    pub fn set_round_total(&mut self, id: CustomerId, on: bool) -> Result<()> {
        self.customer_mut(id)?.adjustments.round_total = on;
        Ok(())
    }

    pub fn toggle_rounding_options(&mut self, id: CustomerId) -> Result<bool> {
        let customer = self.customer_mut(id)?;
        customer.show_rounding_options = !customer.show_rounding_options;
        Ok(customer.show_rounding_options)
    }

    pub fn add_item(&mut self, id: CustomerId, item: LineItem) -> Result<ItemId> {
        Ok(self.customer_mut(id)?.items.insert(item))
    }

    pub fn update_item(&mut self, id: CustomerId, item_id: ItemId, item: LineItem) -> Result<()> {
        let slot = self.customer_mut(id)?.items.get_mut(item_id).ok_or(AppError::ItemNotFound)?;
        *slot = item;
        Ok(())
    }

    pub fn remove_item(&mut self, id: CustomerId, item_id: ItemId) -> Result<LineItem> {
        self.customer_mut(id)?.items.remove(item_id).ok_or(AppError::ItemNotFound)
    }

    pub fn clear_items(&mut self, id: CustomerId) -> Result<()> {
        self.customer_mut(id)?.items.clear();
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn bill_text(&self, id: CustomerId) -> Result<String> {
        let customer = self.customer(id)?;
        Ok(generate_bill_text(customer, &self.catalog, &self.currency))
    }

    /// Freezes the customer's current bill into the history log.
    pub fn record_bill(&mut self, id: CustomerId) -> Result<&BillSnapshot> {
        let customer = self.customer(id)?;
        let snapshot = BillSnapshot {
            customer_name: customer.name.clone(),
            bill_text: generate_bill_text(customer, &self.catalog, &self.currency),
            total: summarize(customer, &self.catalog).total,
            created_at: Local::now(),
        };
        Ok(self.history.append(snapshot))
    }

    pub fn history(&self) -> &BillHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricingPreset;
    use crate::pricing::default_presets;
    use std::num::NonZeroU32;

    fn state() -> AppState {
        AppState::new(Catalog::from_presets(default_presets()).unwrap(), "₹")
    }

    fn names(state: &AppState) -> Vec<String> {
        state.customers.values().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn test_starts_with_one_customer() {
        let s = state();
        assert_eq!(names(&s), vec!["Customer 1"]);
    }

    #[test]
    fn test_default_names_follow_count() {
        let mut s = state();
        s.add_customer();
        let third = s.add_customer();
        assert_eq!(names(&s), vec!["Customer 1", "Customer 2", "Customer 3"]);

        // not renumbered: the next default collides with the remaining "Customer 3"
        let first = s.customers.keys().next().unwrap();
        s.delete_customer(first).unwrap();
        s.add_customer();
        assert_eq!(names(&s), vec!["Customer 2", "Customer 3", "Customer 3"]);
        assert_eq!(s.customer(third).unwrap().name, "Customer 3");
    }

    #[test]
    fn test_delete_keeps_others_intact() {
        let mut s = state();
        let a = s.customers.keys().next().unwrap();
        let b = s.add_customer();
        let c = s.add_customer();
        s.add_item(a, LineItem::new("a1", "A4 B/W", 1)).unwrap();
        s.add_item(c, LineItem::new("c1", "A3 Color", 2)).unwrap();
        s.add_item(c, LineItem::new("c2", "A4 B/W", 3)).unwrap();

        let removed = s.delete_customer(b).unwrap();
        assert_eq!(removed.name, "Customer 2");
        assert_eq!(names(&s), vec!["Customer 1", "Customer 3"]);
        assert_eq!(s.customer(a).unwrap().items.len(), 1);
        let c_items: Vec<_> = s.customer(c).unwrap().items.values().map(|i| i.name.clone()).collect();
        assert_eq!(c_items, vec!["c1", "c2"]);
        assert!(matches!(s.delete_customer(b), Err(AppError::CustomerNotFound)));
    }

    #[test]
    fn test_item_crud() {
        let mut s = state();
        let id = s.customers.keys().next().unwrap();
        let first = s.add_item(id, LineItem::new("one", "A4 B/W", 1)).unwrap();
        let second = s.add_item(id, LineItem::new("two", "A4 B/W", 2)).unwrap();

        s.update_item(id, second, LineItem::new("two", "A3 Color", 2).with_sets(3)).unwrap();
        assert_eq!(s.customer(id).unwrap().items.get(second).unwrap().sets(), 3);

        s.remove_item(id, first).unwrap();
        assert!(matches!(s.remove_item(id, first), Err(AppError::ItemNotFound)));
        assert_eq!(s.customer(id).unwrap().items.len(), 1);

        s.clear_items(id).unwrap();
        assert!(s.customer(id).unwrap().items.is_empty());
    }

    #[test]
    fn test_catalog_edit_reprices_bill() {
        let mut s = state();
        let id = s.customers.keys().next().unwrap();
        s.add_item(id, LineItem::new("Notes", "A4 B/W", 10)).unwrap();
        assert!(s.bill_text(id).unwrap().ends_with("Total: ₹10.00"));

        s.catalog
            .update("A4 B/W", PricingPreset::new("A4 B/W", NonZeroU32::MIN, 1.5))
            .unwrap();
        assert!(s.bill_text(id).unwrap().ends_with("Total: ₹15.00"));
    }

    #[test]
    fn test_recorded_bill_is_frozen() {
        let mut s = state();
        let id = s.customers.keys().next().unwrap();
        s.add_item(id, LineItem::new("Notes", "A4 B/W", 10)).unwrap();
        s.set_discount(id, Some(2.0)).unwrap();
        s.set_tax(id, Some(50.0)).unwrap();

        let total = s.record_bill(id).unwrap().total;
        assert_eq!(total, 12.0);

        s.clear_items(id).unwrap();
        s.rename_customer(id, "Renamed").unwrap();
        let snap = &s.history().entries()[0];
        assert_eq!(snap.customer_name, "Customer 1");
        assert_eq!(snap.total, 12.0);
        assert!(snap.bill_text.contains("Notes (A4 B/W, 10 pages, 1 sets)"));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_toggles() {
        let mut s = state();
        let id = s.customers.keys().next().unwrap();
        assert!(s.toggle_rounding_options(id).unwrap());
        assert!(!s.toggle_rounding_options(id).unwrap());
        s.set_round_individual(id, true).unwrap();
        s.set_round_total(id, true).unwrap();
        let adj = &s.customer(id).unwrap().adjustments;
        assert!(adj.round_individual && adj.round_total);
        assert!(s.toggle_dark_mode());
        assert!(!s.toggle_dark_mode());
    }
}
