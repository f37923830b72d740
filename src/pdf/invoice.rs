use chrono::NaiveDateTime;
use tracing::debug;

use super::layout::{layout, LaidOutDocument, PageGeometry};
use super::metrics::FontFace;
use super::model::{Align, Block, Cell, Color, Paragraph, Row, RowKind, Table, TextStyle};
use super::writer::write_pdf;
use crate::error::{InvoiceError, Result};
use crate::invoice::{
    calculate_totals, format_currency, format_money, line_total_post_tax, line_total_pre_tax,
    tax_rate_label, InvoiceTotals, LineItem, PaymentInfo, StoreLocation,
};

const TITLE: TextStyle = TextStyle::new(FontFace::Bold, 18.0, 22.0);
const NORMAL: TextStyle = TextStyle::new(FontFace::Regular, 10.0, 12.0);
const NORMAL_BOLD: TextStyle = NORMAL.with_face(FontFace::Bold);
const FOOTER: TextStyle = NORMAL.with_face(FontFace::Italic);
const SMALL: TextStyle = TextStyle::new(FontFace::Regular, 8.0, 10.0);
const SMALL_BOLD: TextStyle = SMALL.with_face(FontFace::Bold);

/// Description, unit price, qty, pre-tax and post-tax line totals
pub const COLUMN_WIDTHS: [f32; 5] = [220.0, 60.0, 40.0, 70.0, 80.0];

pub const HEADER_LABELS: [&str; 5] = [
    "Item Description",
    "Unit Price",
    "Qty",
    "SubTotal",
    "Total",
];

/// Width of the rules separating the items from the summary block
const SUMMARY_RULE: f32 = 0.5;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything printed on one invoice
#[derive(Debug, Clone)]
pub struct InvoiceContent<'a> {
    pub brand: &'a str,
    pub location: StoreLocation,
    pub client_name: &'a str,
    pub phone: &'a str,
    pub items: &'a [LineItem],
    pub payment: PaymentInfo,
    pub totals: InvoiceTotals,
}

impl InvoiceContent<'_> {
    /// Reject content a well-behaved caller would never pass in
    pub fn check(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(InvoiceError::MissingField("Client name"));
        }
        if self.phone.trim().is_empty() {
            return Err(InvoiceError::MissingField("Phone number"));
        }
        if self.items.is_empty() {
            return Err(InvoiceError::NoItems);
        }

        let expected = calculate_totals(self.items);
        if expected != self.totals {
            return Err(InvoiceError::TotalsMismatch {
                expected: expected.total,
                actual: self.totals.total,
            });
        }
        Ok(())
    }

    pub fn title(&self) -> String {
        format!("{} Store Invoice", self.brand)
    }
}

fn labelled(label: &str, value: impl Into<String>) -> Block {
    Block::Paragraph(
        Paragraph::new()
            .run(format!("{label}:"), NORMAL_BOLD)
            .run(format!(" {}", value.into()), NORMAL),
    )
}

/// The invoice as a sequence of blocks, top to bottom
pub fn invoice_blocks(content: &InvoiceContent<'_>, generated_at: NaiveDateTime) -> Vec<Block> {
    let mut blocks = vec![
        Block::Paragraph(Paragraph::plain(content.title(), TITLE).aligned(Align::Center)),
        Block::Spacer(12.0),
        labelled("Store Location", content.location.as_str()),
        Block::Spacer(6.0),
        labelled("Customer Name", content.client_name),
        labelled("Phone Number", content.phone),
        labelled("Date", generated_at.format(TIMESTAMP_FORMAT).to_string()),
        labelled("Payment Type", content.payment.method().to_string()),
    ];

    if let PaymentInfo::Cash { cash_given, change } = content.payment {
        blocks.push(labelled("Cash Given", format_currency(cash_given)));
        blocks.push(labelled("Change", format_currency(change)));
    }

    blocks.push(Block::Spacer(12.0));
    blocks.push(Block::Table(item_table(content.items, &content.totals)));
    blocks.push(Block::Spacer(24.0));
    blocks.push(Block::Paragraph(Paragraph::plain(
        format!("Thank you for shopping at {}!", content.brand),
        FOOTER,
    )));
    blocks
}

fn numeric(text: String) -> Cell {
    Cell::text(text, SMALL, Align::Right)
}

fn summary_row(label: &str, value: String, style: TextStyle) -> Row {
    Row::new(
        RowKind::Summary,
        vec![
            Cell::empty().span(3),
            Cell::text(label, style, Align::Right),
            Cell::text(value, style, Align::Right),
        ],
    )
}

/// Header row, one row per item in order, then Subtotal / Tax / TOTAL
pub fn item_table(items: &[LineItem], totals: &InvoiceTotals) -> Table {
    let mut table = Table::new(COLUMN_WIDTHS.to_vec(), SMALL);

    table.push_row(Row::new(
        RowKind::Header,
        HEADER_LABELS
            .iter()
            .map(|label| Cell::text(*label, SMALL_BOLD, Align::Left).background(Color::LIGHT_GREY))
            .collect(),
    ));

    for item in items {
        table.push_row(Row::new(
            RowKind::Body,
            vec![
                Cell::text(item.description(), SMALL, Align::Left),
                numeric(format_money(item.unit_price())),
                numeric(item.quantity().to_string()),
                numeric(format_money(line_total_pre_tax(item))),
                numeric(format_money(line_total_post_tax(item))),
            ],
        ));
    }

    let mut subtotal = summary_row("Subtotal", format_money(totals.subtotal), SMALL);
    for cell in subtotal.cells.iter_mut().skip(1) {
        cell.rule_above = Some(SUMMARY_RULE);
    }
    table.push_row(subtotal);

    table.push_row(summary_row(
        &format!("Tax ({})", tax_rate_label()),
        format_money(totals.tax),
        SMALL,
    ));

    let mut total = summary_row("TOTAL", format_money(totals.total), SMALL_BOLD);
    for cell in total.cells.iter_mut().skip(1) {
        cell.rule_above = Some(SUMMARY_RULE);
        cell.background = Some(Color::LIGHT_GREY);
    }
    table.push_row(total);

    table
}

/// Lay out the invoice on letter pages without producing bytes
pub fn layout_invoice(
    content: &InvoiceContent<'_>,
    generated_at: NaiveDateTime,
) -> Result<LaidOutDocument> {
    content.check()?;
    let document = layout(&invoice_blocks(content, generated_at), PageGeometry::LETTER);
    debug!(
        pages = document.page_count(),
        items = content.items.len(),
        "invoice laid out"
    );
    Ok(document)
}

/// Render the invoice to a finished PDF buffer
pub fn render_invoice(
    content: &InvoiceContent<'_>,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>> {
    let document = layout_invoice(content, generated_at)?;
    write_pdf(&document, &content.title())
}
