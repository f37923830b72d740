use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InvoiceError, Result};

/// A single purchasable entry on the invoice.
///
/// Fields are private so every value in circulation has passed validation:
/// a non-empty description, a non-negative unit price in cents precision
/// and a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord")]
pub struct LineItem {
    description: String,
    unit_price: Decimal,
    quantity: u32,
}

/// Unvalidated shape of a line item as stored in session.toml
#[derive(Deserialize)]
struct LineItemRecord {
    description: String,
    unit_price: Decimal,
    quantity: u32,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = InvoiceError;

    fn try_from(record: LineItemRecord) -> Result<Self> {
        LineItem::new(record.description, record.unit_price, record.quantity)
    }
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: Decimal, quantity: u32) -> Result<Self> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(InvoiceError::EmptyDescription);
        }

        if unit_price < Decimal::ZERO {
            return Err(InvoiceError::InvalidPrice {
                item: description,
                price: unit_price,
                reason: "must not be negative".to_string(),
            });
        }

        if quantity == 0 {
            return Err(InvoiceError::InvalidQuantity {
                item: description,
                qty: quantity,
            });
        }

        Ok(Self {
            description,
            unit_price: to_cents(unit_price),
            quantity,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Copy of this item with a different price and/or quantity
    pub fn with_changes(&self, unit_price: Option<Decimal>, quantity: Option<u32>) -> Result<Self> {
        LineItem::new(
            self.description.clone(),
            unit_price.unwrap_or(self.unit_price),
            quantity.unwrap_or(self.quantity),
        )
    }
}

fn to_cents(value: Decimal) -> Decimal {
    // -0.00 would otherwise print with a sign
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Store branches an invoice can be issued from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum StoreLocation {
    #[serde(rename = "NY")]
    Ny,
    Sauga,
    Dragona,
    Ottawa,
}

impl StoreLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreLocation::Ny => "NY",
            StoreLocation::Sauga => "Sauga",
            StoreLocation::Dragona => "Dragona",
            StoreLocation::Ottawa => "Ottawa",
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
