pub mod config;
pub mod error;
pub mod invoice;
pub mod pdf;

pub use config::{Config, PendingInput, Session};
pub use error::{InvoiceError, Result};
pub use invoice::{
    calculate_totals, generate_invoice, InvoiceRequest, InvoiceTotals, LineItem, PaymentInfo,
    PaymentMethod, StoreLocation, TAX_RATE,
};
pub use pdf::{render_invoice, InvoiceContent};
