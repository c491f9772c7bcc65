use comfy_table::{Attribute, Cell, Color, Table};

use crate::billing::{format_price, summarize};
use crate::history::BillHistory;
use crate::model::Customer;
use crate::pricing::Catalog;

fn accent(dark_mode: bool) -> Color {
    if dark_mode {
        Color::Rgb { r: 110, g: 231, b: 183 }
    } else {
        Color::Rgb { r: 4, g: 120, b: 87 }
    }
}

pub fn presets_table(catalog: &Catalog, currency: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Preset"),
        Cell::new("Pages / Sheet"),
        Cell::new("Price / Sheet"),
    ]);
    for preset in catalog.presets() {
        table.add_row(vec![
            Cell::new(&preset.name),
            Cell::new(preset.pages_per_sheet),
            Cell::new(format!("{}{:.2}", currency, preset.price_per_sheet)),
        ]);
    }
    table
}

pub fn customer_table(customer: &Customer, catalog: &Catalog, currency: &str, dark_mode: bool) -> Table {
    let summary = summarize(customer, catalog);
    let adj = &customer.adjustments;

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Item"),
        Cell::new("Type"),
        Cell::new("Pages"),
        Cell::new("Sets"),
        Cell::new("Price"),
    ]);

    for priced in &summary.items {
        let type_cell = if catalog.get(&priced.item.job_type).is_some() {
            Cell::new(&priced.item.job_type)
        } else {
            // unpriced job
            Cell::new(format!("{} (?)", priced.item.job_type)).fg(Color::Rgb { r: 185, g: 28, b: 28 })
        };
        table.add_row(vec![
            Cell::new(&priced.item.name),
            type_cell,
            Cell::new(priced.item.pages),
            Cell::new(priced.item.sets()),
            Cell::new(format!("{}{}", currency, format_price(priced.price, adj.round_individual))),
        ]);
    }

    table.add_row(vec![
        Cell::new("Discount"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("-{}{:.2}", currency, summary.discount)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Tax ({}%)", summary.tax_percent)),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{}{:.2}", currency, summary.tax_amount())),
    ]);
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{}{}", currency, format_price(summary.total, adj.round_total)))
            .add_attribute(Attribute::Bold)
            .fg(accent(dark_mode)),
    ]);
    table
}

pub fn history_table(history: &BillHistory, currency: &str, dark_mode: bool) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Recorded"),
        Cell::new("Customer"),
        Cell::new("Total"),
    ]);
    for (i, snap) in history.entries().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(snap.created_at.format("%d/%m/%Y %H:%M")),
            Cell::new(&snap.customer_name),
            Cell::new(format!("{}{:.2}", currency, snap.total)).fg(accent(dark_mode)),
        ]);
    }
    table
}
