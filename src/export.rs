use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use slug::slugify;
use tracing::info;

use crate::error::Result;
use crate::model::Customer;
use crate::state::AppState;

pub const CSV_FILE_NAME: &str = "sr_xerox_bill.csv";
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";
pub const CSV_HEADER: [&str; 6] = ["Customer", "Item", "Type", "Pages", "Sets", "Price"];

#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub customer: String,
    pub item: String,
    pub job_type: String,
    pub pages: u32,
    pub sets: u32,
    pub price: f64,
}

impl CsvRow {
    fn to_record(&self) -> [String; 6] {
        [
            self.customer.clone(),
            self.item.clone(),
            self.job_type.clone(),
            self.pages.to_string(),
            self.sets.to_string(),
            self.price.to_string(),
        ]
    }
}

/// One row per line item, customers in order, prices unrounded.
pub fn csv_rows(state: &AppState) -> Vec<CsvRow> {
    state
        .customers
        .values()
        .flat_map(|customer| {
            customer.items.values().map(move |item| CsvRow {
                customer: customer.name.clone(),
                item: item.name.clone(),
                job_type: item.job_type.clone(),
                pages: item.pages,
                sets: item.sets(),
                price: state.catalog.calculate_price(&item.job_type, item.pages, item.sets()),
            })
        })
        .collect()
}

pub fn write_csv<W: Write>(writer: W, state: &AppState) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    let rows = csv_rows(state);
    for row in &rows {
        wtr.write_record(row.to_record())?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn save_csv(path: &Path, state: &AppState) -> Result<usize> {
    let file = fs::File::create(path)?;
    let count = write_csv(file, state)?;
    info!("Wrote {} rows to {:?}", count, path);
    Ok(count)
}

pub fn bill_text_file_name(customer: &Customer) -> String {
    let slug = slugify(&customer.name);
    if slug.is_empty() { "bill.txt".to_string() } else { format!("{}.txt", slug) }
}

pub fn write_bill_text(dir: &Path, customer: &Customer, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(bill_text_file_name(customer));
    fs::write(&path, text)?;
    info!("Wrote bill for {} to {:?}", customer.name, path);
    Ok(path)
}
