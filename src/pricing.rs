use std::num::NonZeroU32;

use tracing::warn;

use crate::error::{AppError, Result};
use crate::model::PricingPreset;

/// Ordered list of presets, looked up by exact name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    presets: Vec<PricingPreset>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, applying the same checks as [`Catalog::add`] to every preset.
    pub fn from_presets(presets: Vec<PricingPreset>) -> Result<Self> {
        let mut catalog = Catalog::new();
        for preset in presets {
            catalog.add(preset)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&PricingPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn presets(&self) -> &[PricingPreset] {
        &self.presets
    }

    pub fn names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn add(&mut self, preset: PricingPreset) -> Result<()> {
        check_price(&preset)?;
        if self.get(&preset.name).is_some() {
            return Err(AppError::DuplicatePreset(preset.name));
        }
        self.presets.push(preset);
        Ok(())
    }

    /// Replaces the preset called `name`. The replacement may carry a new name as long as it
    /// doesn't clash with another preset.
    pub fn update(&mut self, name: &str, preset: PricingPreset) -> Result<()> {
        check_price(&preset)?;
        let pos = self
            .presets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| AppError::PresetNotFound(name.to_string()))?;
        if preset.name != name && self.get(&preset.name).is_some() {
            return Err(AppError::DuplicatePreset(preset.name));
        }
        self.presets[pos] = preset;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<PricingPreset> {
        let pos = self
            .presets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| AppError::PresetNotFound(name.to_string()))?;
        Ok(self.presets.remove(pos))
    }

    /// Price of a job before any rounding, discount or tax.
    ///
    /// An unknown `job_type` prices as zero.
    pub fn calculate_price(&self, job_type: &str, pages: u32, sets: u32) -> f64 {
        match self.get(job_type) {
            Some(preset) => {
                let sheets = sheets_needed(pages, preset.pages_per_sheet);
                preset.price_per_sheet * f64::from(sheets) * f64::from(sets)
            }
            None => {
                warn!("No preset named '{}', pricing job at 0", job_type);
                0.0
            }
        }
    }
}

pub fn sheets_needed(pages: u32, pages_per_sheet: NonZeroU32) -> u32 {
    pages.div_ceil(pages_per_sheet.get())
}

fn check_price(preset: &PricingPreset) -> Result<()> {
    if preset.price_per_sheet.is_finite() && preset.price_per_sheet >= 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidPrice { name: preset.name.clone(), price: preset.price_per_sheet })
    }
}

pub fn default_presets() -> Vec<PricingPreset> {
    vec![
        PricingPreset::new("A4 B/W", NonZeroU32::MIN, 1.0),
        PricingPreset::new("A3 Color", NonZeroU32::MIN, 10.0),
    ]
}
