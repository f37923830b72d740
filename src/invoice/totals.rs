use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use super::item::LineItem;

/// Sales tax applied to every invoice (13%)
pub const TAX_RATE: Decimal = dec!(0.13);

/// Subtotal, tax and total derived from a list of line items.
///
/// Values are kept unrounded so that `total == subtotal + tax` holds exactly;
/// rounding to cents happens only when a value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Total rounded to cents: the amount the customer actually pays
    pub fn amount_due(&self) -> Decimal {
        round_cents(self.total)
    }
}

/// Sum the line items and apply the tax rate
pub fn calculate_totals(items: &[LineItem]) -> InvoiceTotals {
    let subtotal: Decimal = items.iter().map(line_total_pre_tax).sum();
    let tax = subtotal * TAX_RATE;

    InvoiceTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

pub fn line_total_pre_tax(item: &LineItem) -> Decimal {
    item.unit_price() * Decimal::from(item.quantity())
}

pub fn line_total_post_tax(item: &LineItem) -> Decimal {
    line_total_pre_tax(item) * (Decimal::ONE + TAX_RATE)
}

/// Tax rate as a whole percentage label, e.g. "13%"
pub fn tax_rate_label() -> String {
    format!("{}%", (TAX_RATE * dec!(100)).normalize())
}

pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two fraction digits
pub fn format_money(value: Decimal) -> String {
    let rounded = round_cents(value);
    // avoid "-0.00"
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{:.2}", rounded)
}

pub fn format_currency(value: Decimal) -> String {
    format!("${}", format_money(value))
}
