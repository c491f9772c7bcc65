use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::model::PricingPreset;
use crate::pricing::Catalog;

const DEFAULT_SETTINGS: &str = include_str!("../settings.toml");

fn default_shop_name() -> String {
    "SR XEROX".to_string()
}

fn default_currency() -> String {
    "₹".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_shop_name")]
    pub shop_name: String,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
    #[serde(default)]
    pub dark_mode: bool,
    /// Where exports land when no save dialog is available. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub presets: Vec<PricingPreset>,
}

impl AppSettings {
    pub fn parse(content: &str) -> Result<Self> {
        let settings: AppSettings = toml::from_str(content)?;
        // surfaces duplicate names and bad prices as config errors
        settings.catalog()?;
        Ok(settings)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::from_presets(self.presets.clone())
            .map_err(|e| AppError::Config(format!("invalid preset: {}", e)))
    }

    pub fn share_title(&self) -> String {
        format!("{} Bill", self.shop_name)
    }

    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => PathBuf::from(expand_home_dir(dir)),
            None => PathBuf::from("."),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        // the embedded file is checked by tests
        AppSettings::parse(DEFAULT_SETTINGS).unwrap_or_else(|_| AppSettings {
            shop_name: default_shop_name(),
            currency_symbol: default_currency(),
            dark_mode: false,
            output_dir: None,
            presets: crate::pricing::default_presets(),
        })
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "sr-xerox", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

/// Reads settings from `path`, writing the embedded defaults there first if it doesn't exist.
pub fn load_or_init(path: &Path) -> Result<AppSettings> {
    if path.exists() {
        debug!("Loading settings from {:?}", path);
        let content = fs::read_to_string(path)?;
        AppSettings::parse(&content)
    } else {
        info!("Initializing default settings at {:?}", path);
        fs::write(path, DEFAULT_SETTINGS)?;
        AppSettings::parse(DEFAULT_SETTINGS)
    }
}

pub fn save(path: &Path, settings: &AppSettings) -> Result<()> {
    let toml_str = toml::to_string_pretty(settings)?;
    fs::write(path, toml_str)?;
    info!("Settings saved to {:?}", path);
    Ok(())
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let settings = AppSettings::parse(DEFAULT_SETTINGS).unwrap();
        assert_eq!(settings.shop_name, "SR XEROX");
        assert_eq!(settings.currency_symbol, "₹");
        assert_eq!(settings.share_title(), "SR XEROX Bill");
        let catalog = settings.catalog().unwrap();
        assert_eq!(catalog.calculate_price("A3 Color", 7, 1), 70.0);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_zero_pages_per_sheet_rejected() {
        let content = r#"
            [[presets]]
            name = "Broken"
            pages_per_sheet = 0
            price_per_sheet = 1.0
        "#;
        assert!(matches!(AppSettings::parse(content), Err(AppError::TomlDe { .. })));
    }

    #[test]
    fn test_duplicate_presets_rejected() {
        let content = r#"
            [[presets]]
            name = "A4"
            pages_per_sheet = 1
            price_per_sheet = 1.0

            [[presets]]
            name = "A4"
            pages_per_sheet = 2
            price_per_sheet = 1.0
        "#;
        assert!(matches!(AppSettings::parse(content), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = AppSettings::parse("").unwrap();
        assert_eq!(settings.currency_symbol, "₹");
        assert!(settings.presets.is_empty());
        assert_eq!(settings.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = load_or_init(&path).unwrap();
        assert!(path.exists());

        settings.currency_symbol = "Rs.".to_string();
        settings.presets.pop();
        save(&path, &settings).unwrap();

        let reloaded = load_or_init(&path).unwrap();
        assert_eq!(reloaded.currency_symbol, "Rs.");
        assert_eq!(reloaded.presets.len(), 1);
    }

    #[test]
    fn test_expand_home_dir_leaves_plain_paths() {
        assert_eq!(expand_home_dir("/tmp/out"), "/tmp/out");
    }
}
