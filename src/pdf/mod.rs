mod invoice;
pub mod layout;
pub mod metrics;
pub mod model;
mod writer;

pub use invoice::{
    invoice_blocks, item_table, layout_invoice, render_invoice, InvoiceContent, COLUMN_WIDTHS,
    HEADER_LABELS, TIMESTAMP_FORMAT,
};
pub use layout::{layout, DrawOp, LaidOutDocument, Page, PageGeometry};
pub use writer::write_pdf;
