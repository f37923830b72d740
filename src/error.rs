use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'flooreno-invoice init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Item description must not be empty")]
    EmptyDescription,

    #[error("Invalid unit price {price} for '{item}': {reason}")]
    InvalidPrice {
        item: String,
        price: Decimal,
        reason: String,
    },

    #[error("Invalid quantity {qty} for '{item}': must be at least 1")]
    InvalidQuantity { item: String, qty: u32 },

    #[error("Invalid item index {index} (the invoice has {count} item(s)). Use 'flooreno-invoice items' to list them.")]
    InvalidItemIndex { index: usize, count: usize },

    #[error("No items on the invoice. Use 'flooreno-invoice add' to add line items.")]
    NoItems,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Insufficient cash: ${given:.2} given for a total of ${due:.2}")]
    InsufficientCash { due: Decimal, given: Decimal },

    #[error("Cash given must not be negative (got {0})")]
    NegativeCash(Decimal),

    #[error("Totals do not match the line items (expected total {expected}, got {actual})")]
    TotalsMismatch { expected: Decimal, actual: Decimal },

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
