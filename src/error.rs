use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV write error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("Settings parse error: {source}")]
    TomlDe {
        #[from]
        source: toml::de::Error,
    },

    #[error("Settings write error: {source}")]
    TomlSer {
        #[from]
        source: toml::ser::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Preset '{0}' already exists")]
    DuplicatePreset(String),

    #[error("Preset '{0}' not found")]
    PresetNotFound(String),

    #[error("Invalid price per sheet for '{name}': {price}")]
    InvalidPrice { name: String, price: f64 },

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Line item not found")]
    ItemNotFound,
}

pub type Result<T> = std::result::Result<T, AppError>;
