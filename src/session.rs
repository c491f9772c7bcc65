use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, CustomUserError, InquireError, Select, Text};
use tracing::debug;

use crate::config::{self, AppSettings};
use crate::export::{self, CSV_FILE_NAME, CSV_MIME_TYPE};
use crate::model::{CustomerId, ItemId, LineItem, PricingPreset};
use crate::render::{customer_table, history_table, presets_table};
use crate::opener;
use crate::share::{self, ShareSurface};
use crate::state::AppState;

/// Treats Esc / Ctrl-C as "go back" instead of an error.
fn ask<T>(answer: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_optional_amount(input: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("'{}' is not a number", trimmed)),
    }
}

fn validate_amount(input: &str) -> std::result::Result<Validation, CustomUserError> {
    Ok(match parse_optional_amount(input) {
        Ok(_) => Validation::Valid,
        Err(msg) => Validation::Invalid(msg.into()),
    })
}

pub struct Session<'a> {
    state: AppState,
    settings: AppSettings,
    settings_path: PathBuf,
    surface: &'a dyn ShareSurface,
}

// ==========================================
// Menus
// ==========================================

enum MainChoice {
    Settings,
    Customer(CustomerId),
    AddCustomer,
    DownloadCsv,
    History,
    ToggleDarkMode,
    Quit,
}

enum SettingsAction {
    Add,
    Edit,
    Remove,
    Save,
    Back,
}

impl fmt::Display for SettingsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SettingsAction::Add => "➕ Add Preset",
            SettingsAction::Edit => "✏️  Edit Preset",
            SettingsAction::Remove => "🗑  Remove Preset",
            SettingsAction::Save => "💾 Save Presets to Settings File",
            SettingsAction::Back => "↩  Back",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy)]
enum CustomerAction {
    AddItem,
    EditItem,
    RemoveItem,
    Discount,
    Tax,
    RoundingOptions,
    RoundIndividual(bool),
    RoundTotal(bool),
    Rename,
    ShowBill,
    Copy,
    Share,
    SaveText,
    Record,
    Clear,
    Delete,
    Back,
}

impl fmt::Display for CustomerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |on: bool| if on { "ON" } else { "OFF" };
        match self {
            CustomerAction::AddItem => f.write_str("➕ Add Item"),
            CustomerAction::EditItem => f.write_str("✏️  Edit Item"),
            CustomerAction::RemoveItem => f.write_str("➖ Remove Item"),
            CustomerAction::Discount => f.write_str("💸 Set Discount"),
            CustomerAction::Tax => f.write_str("🧾 Set Tax %"),
            CustomerAction::RoundingOptions => f.write_str("🔧 Rounding Options"),
            CustomerAction::RoundIndividual(on) => write!(f, "   Round Individual Items: {}", on_off(*on)),
            CustomerAction::RoundTotal(on) => write!(f, "   Round Total: {}", on_off(*on)),
            CustomerAction::Rename => f.write_str("🏷  Rename Customer"),
            CustomerAction::ShowBill => f.write_str("📄 Show Bill"),
            CustomerAction::Copy => f.write_str("📋 Copy Bill"),
            CustomerAction::Share => f.write_str("📤 Share Bill"),
            CustomerAction::SaveText => f.write_str("💾 Save Bill as Text"),
            CustomerAction::Record => f.write_str("🕘 Record Bill in History"),
            CustomerAction::Clear => f.write_str("🧹 Clear Items"),
            CustomerAction::Delete => f.write_str("🗑  Delete Customer"),
            CustomerAction::Back => f.write_str("↩  Back"),
        }
    }
}

impl<'a> Session<'a> {
    pub fn new(settings: AppSettings, settings_path: PathBuf, surface: &'a dyn ShareSurface) -> Result<Self> {
        let mut state = AppState::new(settings.catalog()?, settings.currency_symbol.clone());
        state.dark_mode = settings.dark_mode;
        Ok(Session { state, settings, settings_path, surface })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("\n🖨  {} - Price Calculator", self.settings.shop_name);
        loop {
            let Some(choice) = self.main_menu()? else { break };
            match choice {
                MainChoice::Settings => self.settings_menu()?,
                MainChoice::Customer(id) => self.customer_menu(id)?,
                MainChoice::AddCustomer => {
                    let id = self.state.add_customer();
                    println!("✅ Added {}", self.state.customer(id)?.name);
                    self.customer_menu(id)?;
                }
                MainChoice::DownloadCsv => self.download_csv()?,
                MainChoice::History => self.history_menu()?,
                MainChoice::ToggleDarkMode => {
                    let dark = self.state.toggle_dark_mode();
                    println!("{}", if dark { "🌙 Dark mode on" } else { "☀️  Light mode on" });
                }
                MainChoice::Quit => break,
            }
        }
        println!("👋 Bye!");
        Ok(())
    }

    fn main_menu(&self) -> Result<Option<MainChoice>> {
        let mut labels = vec!["⚙️  Settings".to_string()];
        let mut choices = vec![MainChoice::Settings];

        for (id, customer) in self.state.customers.iter() {
            labels.push(format!("👤 {} ({} items)", customer.name, customer.items.len()));
            choices.push(MainChoice::Customer(id));
        }

        labels.push("➕ Add Customer".to_string());
        choices.push(MainChoice::AddCustomer);
        labels.push(format!("📄 Download CSV ({})", CSV_FILE_NAME));
        choices.push(MainChoice::DownloadCsv);
        labels.push(format!("🕘 Bill History ({})", self.state.history().len()));
        choices.push(MainChoice::History);
        labels.push(if self.state.dark_mode { "☀️  Light Mode" } else { "🌙 Dark Mode" }.to_string());
        choices.push(MainChoice::ToggleDarkMode);
        labels.push("🚪 Quit".to_string());
        choices.push(MainChoice::Quit);

        let Some(picked) = ask(Select::new("Main Menu:", labels).with_page_size(12).raw_prompt())? else {
            return Ok(None);
        };
        Ok(choices.into_iter().nth(picked.index))
    }

    // ==========================================
    // Settings tab (presets)
    // ==========================================

    fn settings_menu(&mut self) -> Result<()> {
        loop {
            println!("\n--- Pricing Presets ---");
            println!("{}", presets_table(&self.state.catalog, &self.state.currency));

            let actions = vec![
                SettingsAction::Add,
                SettingsAction::Edit,
                SettingsAction::Remove,
                SettingsAction::Save,
                SettingsAction::Back,
            ];
            let Some(action) = ask(Select::new("Settings:", actions).prompt())? else { return Ok(()) };

            match action {
                SettingsAction::Add => {
                    if let Some(preset) = self.preset_wizard(None)? {
                        match self.state.catalog.add(preset) {
                            Ok(()) => println!("✅ Preset added."),
                            Err(e) => println!("❌ {}", e),
                        }
                    }
                }
                SettingsAction::Edit => {
                    let Some(name) = self.pick_preset("Select Preset to Edit:")? else { continue };
                    let current = self.state.catalog.get(&name).cloned();
                    if let Some(preset) = self.preset_wizard(current.as_ref())? {
                        match self.state.catalog.update(&name, preset) {
                            Ok(()) => println!("✅ Preset updated. Existing items are repriced."),
                            Err(e) => println!("❌ {}", e),
                        }
                    }
                }
                SettingsAction::Remove => {
                    let Some(name) = self.pick_preset("Select Preset to Remove:")? else { continue };
                    if let Err(e) = self.state.catalog.remove(&name) {
                        println!("❌ {}", e);
                    } else {
                        println!("🗑  Removed '{}'. Items of this type now price at 0.", name);
                    }
                }
                SettingsAction::Save => {
                    self.settings.presets = self.state.catalog.presets().to_vec();
                    self.settings.dark_mode = self.state.dark_mode;
                    match config::save(&self.settings_path, &self.settings) {
                        Ok(()) => println!("✅ Settings saved to {:?}", self.settings_path),
                        Err(e) => println!("❌ {}", e),
                    }
                }
                SettingsAction::Back => return Ok(()),
            }
        }
    }

    fn pick_preset(&self, prompt: &str) -> Result<Option<String>> {
        let names = self.state.catalog.names();
        if names.is_empty() {
            println!("❌ No presets configured.");
            return Ok(None);
        }
        ask(Select::new(prompt, names).prompt())
    }

    fn preset_wizard(&self, current: Option<&PricingPreset>) -> Result<Option<PricingPreset>> {
        let mut name_prompt = Text::new("Preset Name (e.g. A4 Duplex):");
        if let Some(p) = current {
            name_prompt = name_prompt.with_default(&p.name);
        }
        let Some(name) = ask(name_prompt.prompt())? else { return Ok(None) };
        let name = name.trim().to_string();
        if name.is_empty() {
            println!("❌ Preset name is required.");
            return Ok(None);
        }

        let default_pps = current.map_or(1, |p| p.pages_per_sheet.get());
        let Some(pages_per_sheet) = ask(
            CustomType::<u32>::new("Pages per Sheet:")
                .with_default(default_pps)
                .with_error_message("Please enter a whole number")
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        let Some(pages_per_sheet) = std::num::NonZeroU32::new(pages_per_sheet) else {
            println!("❌ Pages per sheet must be at least 1.");
            return Ok(None);
        };

        let default_price = current.map_or(1.0, |p| p.price_per_sheet);
        let Some(price) = ask(
            CustomType::<f64>::new("Price per Sheet:")
                .with_default(default_price)
                .with_error_message("Please enter a number")
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        Ok(Some(PricingPreset::new(name, pages_per_sheet, price)))
    }

    // ==========================================
    // Customer tab
    // ==========================================

    fn customer_menu(&mut self, id: CustomerId) -> Result<()> {
        loop {
            let customer = self.state.customer(id)?;
            println!("\n--- {} ---", customer.name);
            println!(
                "{}",
                customer_table(customer, &self.state.catalog, &self.state.currency, self.state.dark_mode)
            );

            let mut actions = vec![
                CustomerAction::AddItem,
                CustomerAction::EditItem,
                CustomerAction::RemoveItem,
                CustomerAction::Discount,
                CustomerAction::Tax,
                CustomerAction::RoundingOptions,
            ];
            if customer.show_rounding_options {
                actions.push(CustomerAction::RoundIndividual(customer.adjustments.round_individual));
                actions.push(CustomerAction::RoundTotal(customer.adjustments.round_total));
            }
            actions.extend([
                CustomerAction::Rename,
                CustomerAction::ShowBill,
                CustomerAction::Copy,
                CustomerAction::Share,
                CustomerAction::SaveText,
                CustomerAction::Record,
                CustomerAction::Clear,
                CustomerAction::Delete,
                CustomerAction::Back,
            ]);

            let Some(action) = ask(Select::new("Action:", actions).with_page_size(18).prompt())? else {
                return Ok(());
            };

            match action {
                CustomerAction::AddItem => {
                    let n = self.state.customer(id)?.items.len() + 1;
                    if let Some(item) = self.item_wizard(None, n)? {
                        self.state.add_item(id, item)?;
                    }
                }
                CustomerAction::EditItem => {
                    let Some(item_id) = self.pick_item(id, "Select Item to Edit:")? else { continue };
                    let current = self.state.customer(id)?.items.get(item_id).cloned();
                    if let Some(item) = self.item_wizard(current.as_ref(), 0)? {
                        self.state.update_item(id, item_id, item)?;
                    }
                }
                CustomerAction::RemoveItem => {
                    let Some(item_id) = self.pick_item(id, "Select Item to Remove:")? else { continue };
                    let removed = self.state.remove_item(id, item_id)?;
                    println!("➖ Removed {}", removed.name);
                }
                CustomerAction::Discount => {
                    let current = self.state.customer(id)?.adjustments.discount;
                    if let Some(value) = self.amount_prompt("Discount (leave empty for none):", current)? {
                        self.state.set_discount(id, value)?;
                    }
                }
                CustomerAction::Tax => {
                    let current = self.state.customer(id)?.adjustments.tax_percent;
                    if let Some(value) = self.amount_prompt("Tax % (leave empty for none):", current)? {
                        self.state.set_tax(id, value)?;
                    }
                }
                CustomerAction::RoundingOptions => {
                    self.state.toggle_rounding_options(id)?;
                }
                CustomerAction::RoundIndividual(on) => self.state.set_round_individual(id, !on)?,
                CustomerAction::RoundTotal(on) => self.state.set_round_total(id, !on)?,
                CustomerAction::Rename => {
                    let current = self.state.customer(id)?.name.clone();
                    if let Some(name) = ask(Text::new("Customer Name:").with_default(&current).prompt())? {
                        if !name.trim().is_empty() {
                            self.state.rename_customer(id, name.trim())?;
                        }
                    }
                }
                CustomerAction::ShowBill => {
                    println!("\n{}\n", self.state.bill_text(id)?);
                }
                CustomerAction::Copy => {
                    let text = self.state.bill_text(id)?;
                    println!("{}", share::copy_bill(self.surface, &text));
                }
                CustomerAction::Share => {
                    let text = self.state.bill_text(id)?;
                    println!("{}", share::share_bill(self.surface, &self.settings.share_title(), &text));
                }
                CustomerAction::SaveText => {
                    let text = self.state.bill_text(id)?;
                    let dir = self.settings.output_dir();
                    match export::write_bill_text(&dir, self.state.customer(id)?, &text) {
                        Ok(path) => {
                            println!("✅ Bill saved: {:?}", path);
                            reveal_saved(&path);
                        }
                        Err(e) => println!("❌ {}", e),
                    }
                }
                CustomerAction::Record => {
                    let snapshot = self.state.record_bill(id)?;
                    println!(
                        "🕘 Recorded bill for {} at {}",
                        snapshot.customer_name,
                        snapshot.created_at.format("%H:%M:%S")
                    );
                }
                CustomerAction::Clear => {
                    if ask(Confirm::new("Clear all items?").with_default(false).prompt())? == Some(true) {
                        self.state.clear_items(id)?;
                        println!("🧹 Items cleared.");
                    }
                }
                CustomerAction::Delete => {
                    let name = self.state.customer(id)?.name.clone();
                    let prompt = format!("Delete {}?", name);
                    if ask(Confirm::new(&prompt).with_default(false).prompt())? == Some(true) {
                        self.state.delete_customer(id)?;
                        println!("🗑  Deleted {}", name);
                        return Ok(());
                    }
                }
                CustomerAction::Back => return Ok(()),
            }
        }
    }

    fn pick_item(&self, id: CustomerId, prompt: &str) -> Result<Option<ItemId>> {
        let customer = self.state.customer(id)?;
        if customer.items.is_empty() {
            println!("❌ No items yet.");
            return Ok(None);
        }
        let keys: Vec<ItemId> = customer.items.keys().collect();
        let labels: Vec<String> = customer
            .items
            .values()
            .enumerate()
            .map(|(i, item)| format!("{}. {} ({}, {} pages)", i + 1, item.name, item.job_type, item.pages))
            .collect();
        let picked = ask(Select::new(prompt, labels).raw_prompt())?;
        Ok(picked.and_then(|p| keys.get(p.index).copied()))
    }

    /// Prompts for a line item. `n` numbers the default name of a new item.
    fn item_wizard(&self, current: Option<&LineItem>, n: usize) -> Result<Option<LineItem>> {
        let default_name = current.map_or_else(|| format!("Item {}", n), |i| i.name.clone());
        let Some(name) = ask(Text::new("Item Name:").with_default(&default_name).prompt())? else {
            return Ok(None);
        };

        let names = self.state.catalog.names();
        let job_type = if names.is_empty() {
            // nothing to pick from, and anything typed will price at 0
            let Some(t) = ask(Text::new("Type:").prompt())? else { return Ok(None) };
            t
        } else {
            let start = current
                .and_then(|i| names.iter().position(|p| *p == i.job_type))
                .unwrap_or(0);
            let Some(t) = ask(Select::new("Type:", names).with_starting_cursor(start).prompt())? else {
                return Ok(None);
            };
            t
        };

        let Some(pages) = ask(
            CustomType::<u32>::new("Pages:")
                .with_default(current.map_or(1, |i| i.pages))
                .with_error_message("Please enter a whole number")
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        let Some(sets) = ask(
            CustomType::<u32>::new("Sets:")
                .with_default(current.map_or(1, |i| i.sets()))
                .with_error_message("Please enter a whole number")
                .prompt(),
        )?
        else {
            return Ok(None);
        };

        debug!("Item {} / {} / {} pages x {}", name, job_type, pages, sets);
        Ok(Some(LineItem::new(name, job_type, pages).with_sets(sets)))
    }

    /// `Ok(None)` when cancelled, `Ok(Some(None))` when cleared.
    fn amount_prompt(&self, prompt: &str, current: Option<f64>) -> Result<Option<Option<f64>>> {
        let default = current.map(|v| v.to_string()).unwrap_or_default();
        let answer = ask(
            Text::new(prompt)
                .with_initial_value(&default)
                .with_validator(validate_amount)
                .prompt(),
        )?;
        Ok(answer.map(|s| parse_optional_amount(&s).ok().flatten()))
    }

    // ==========================================
    // Export & history
    // ==========================================

    fn download_csv(&self) -> Result<()> {
        let out_dir = self.settings.output_dir();
        let Some(path) = pick_save_path(&out_dir, CSV_FILE_NAME)? else {
            println!("Cancelled");
            return Ok(());
        };
        match export::save_csv(&path, &self.state) {
            Ok(rows) => {
                println!("✅ CSV saved ({} rows, {}): {:?}", rows, CSV_MIME_TYPE, path);
                reveal_saved(&path);
            }
            Err(e) => println!("❌ {}", e),
        }
        Ok(())
    }

    fn history_menu(&self) -> Result<()> {
        let history = self.state.history();
        if history.is_empty() {
            println!("(No bills recorded yet)");
            return Ok(());
        }
        println!("{}", history_table(history, &self.state.currency, self.state.dark_mode));

        let dump = ask(Confirm::new("Save history as JSON?").with_default(false).prompt())?;
        if dump == Some(true) {
            let Some(path) = pick_save_path(&self.settings.output_dir(), "bill_history.json")? else {
                return Ok(());
            };
            match history.to_json().and_then(|json| std::fs::write(&path, json).map_err(Into::into)) {
                Ok(()) => {
                    println!("✅ History saved: {:?}", path);
                    reveal_saved(&path);
                }
                Err(e) => println!("❌ {}", e),
            }
        }
        Ok(())
    }
}

fn reveal_saved(path: &Path) {
    if let Err(e) = opener::reveal(path) {
        println!("⚠️  Could not open file manager: {}", e);
    }
}

/// Native save dialog, falling back to a typed path when none is available.
fn pick_save_path(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    println!("📂 Opening save dialog...");
    let picked = rfd::FileDialog::new()
        .set_title("Save As")
        .set_directory(dir)
        .set_file_name(file_name)
        .save_file();

    if picked.is_some() {
        return Ok(picked);
    }

    println!("❌ No file selected. Falling back to manual input.");
    let default = dir.join(file_name).to_string_lossy().to_string();
    let typed = ask(Text::new("Save to:").with_default(&default).prompt())?;
    Ok(typed
        .filter(|p| !p.trim().is_empty())
        .map(|p| PathBuf::from(config::expand_home_dir(p.trim()))))
}
