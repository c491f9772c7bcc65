use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::store::{Key, Store};

pub type CustomerId = Key<Customer>;
pub type ItemId = Key<LineItem>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PricingPreset {
    pub name: String,
    pub pages_per_sheet: NonZeroU32,
    pub price_per_sheet: f64,
}

impl PricingPreset {
    pub fn new(name: impl Into<String>, pages_per_sheet: NonZeroU32, price_per_sheet: f64) -> Self {
        PricingPreset { name: name.into(), pages_per_sheet, price_per_sheet }
    }
}

/// One print job. `job_type` refers to a preset by name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub job_type: String,
    pub pages: u32,
    /// Number of copies of the whole job. Absent means 1.
    #[serde(default)]
    pub sets: Option<NonZeroU32>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, job_type: impl Into<String>, pages: u32) -> Self {
        LineItem { name: name.into(), job_type: job_type.into(), pages, sets: None }
    }

    pub fn with_sets(mut self, sets: u32) -> Self {
        self.sets = NonZeroU32::new(sets);
        self
    }

    pub fn sets(&self) -> u32 {
        self.sets.map_or(1, NonZeroU32::get)
    }
}

/// Per-customer bill adjustments. Missing discount and tax count as 0.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BillAdjustments {
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub tax_percent: Option<f64>,
    #[serde(default)]
    pub round_individual: bool,
    #[serde(default)]
    pub round_total: bool,
}

impl BillAdjustments {
    pub fn discount(&self) -> f64 {
        self.discount.unwrap_or(0.0)
    }

    pub fn tax_percent(&self) -> f64 {
        self.tax_percent.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub name: String,
    pub adjustments: BillAdjustments,
    pub items: Store<LineItem>,
    // Only controls whether the rounding toggles are listed in the customer menu.
    pub show_rounding_options: bool,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Customer {
            name: name.into(),
            adjustments: BillAdjustments::default(),
            items: Store::new(),
            show_rounding_options: false,
        }
    }
}
