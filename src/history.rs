use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;

/// A bill as it looked when it was recorded. Never changes afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BillSnapshot {
    pub customer_name: String,
    pub bill_text: String,
    pub total: f64,
    pub created_at: DateTime<Local>,
}

/// Append-only log of recorded bills for the current session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct BillHistory {
    entries: Vec<BillSnapshot>,
}

impl BillHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, snapshot: BillSnapshot) -> &BillSnapshot {
        self.entries.push(snapshot);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[BillSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
