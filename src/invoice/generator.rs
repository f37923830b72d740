use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::item::{LineItem, StoreLocation};
use super::payment::{settle_payment, PaymentInfo, PaymentMethod};
use super::totals::{calculate_totals, InvoiceTotals};
use crate::error::{InvoiceError, Result};
use crate::pdf::{layout_invoice, write_pdf, InvoiceContent};

/// Customer and payment details collected for one invoice
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub client_name: String,
    pub phone: String,
    pub location: StoreLocation,
    pub payment_method: PaymentMethod,
    pub cash_given: Option<Decimal>,
}

/// A rendered invoice ready to be saved
#[derive(Debug)]
pub struct GeneratedInvoice {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub totals: InvoiceTotals,
    pub payment: PaymentInfo,
    pub generated_at: NaiveDateTime,
    pub pages: usize,
}

/// Decide whether an invoice may be generated: client name, phone and at
/// least one item are required, and a cash payment must cover the total.
pub fn validate_request(
    request: &InvoiceRequest,
    items: &[LineItem],
    totals: &InvoiceTotals,
) -> Result<PaymentInfo> {
    if request.client_name.trim().is_empty() {
        return Err(InvoiceError::MissingField("Client name"));
    }
    if request.phone.trim().is_empty() {
        return Err(InvoiceError::MissingField("Phone number"));
    }
    if items.is_empty() {
        return Err(InvoiceError::NoItems);
    }

    settle_payment(request.payment_method, request.cash_given, totals)
}

/// `Invoice_<client>_<phone>_<YYYYMMDD_HHMMSS>.pdf`
pub fn suggested_file_name(client_name: &str, phone: &str, timestamp: NaiveDateTime) -> String {
    let clean = |s: &str| s.trim().replace([' ', '/', '\\'], "_");
    format!(
        "Invoice_{}_{}_{}.pdf",
        clean(client_name),
        clean(phone),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Validate the request, compute totals and render the document.
/// `generated_at` is printed on the invoice and used in the file name.
pub fn generate_invoice(
    request: &InvoiceRequest,
    items: &[LineItem],
    brand: &str,
    generated_at: NaiveDateTime,
) -> Result<GeneratedInvoice> {
    let totals = calculate_totals(items);
    let payment = validate_request(request, items, &totals)?;

    let content = InvoiceContent {
        brand,
        location: request.location,
        client_name: request.client_name.trim(),
        phone: request.phone.trim(),
        items,
        payment,
        totals,
    };

    let document = layout_invoice(&content, generated_at)?;
    let bytes = write_pdf(&document, &content.title())?;

    info!(
        client = %content.client_name,
        items = items.len(),
        pages = document.page_count(),
        bytes = bytes.len(),
        "invoice rendered"
    );

    Ok(GeneratedInvoice {
        bytes,
        file_name: suggested_file_name(&request.client_name, &request.phone, generated_at),
        totals,
        payment,
        generated_at,
        pages: document.page_count(),
    })
}

/// Write the invoice to `output` if given, otherwise into `output_dir`
/// under its suggested file name. Returns the path written.
pub fn save_invoice(
    invoice: &GeneratedInvoice,
    output_dir: &Path,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let pdf_path = match output {
        Some(path) => path,
        None => {
            fs::create_dir_all(output_dir)?;
            output_dir.join(&invoice.file_name)
        }
    };

    if let Some(parent) = pdf_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pdf_path, &invoice.bytes)?;
    info!(path = %pdf_path.display(), "invoice saved");

    Ok(pdf_path)
}
