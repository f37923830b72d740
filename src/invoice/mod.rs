mod generator;
mod item;
mod payment;
mod totals;

pub use generator::{
    generate_invoice, save_invoice, suggested_file_name, validate_request, GeneratedInvoice,
    InvoiceRequest,
};
pub use item::{LineItem, StoreLocation};
pub use payment::{settle_payment, PaymentInfo, PaymentMethod};
pub use totals::{
    calculate_totals, format_currency, format_money, line_total_post_tax, line_total_pre_tax,
    round_cents, tax_rate_label, InvoiceTotals, TAX_RATE,
};
