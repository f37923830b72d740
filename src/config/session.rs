use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};
use crate::invoice::{calculate_totals, InvoiceTotals, LineItem};

/// The invoice being assembled: ordered line items plus whatever the user
/// has typed for the next item but not yet added.
///
/// Every operation returns a new `Session` and leaves `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub pending: PendingInput,
}

/// Fields of the "add item" form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PendingInput {
    pub name: String,
    pub price: Decimal,
    pub qty: u32,
}

impl Default for PendingInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: Decimal::ZERO,
            qty: 1,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> InvoiceTotals {
        calculate_totals(&self.items)
    }

    /// Append a new item. New items must have a positive price.
    pub fn add_item(&self, name: &str, price: Decimal, qty: u32) -> Result<Session> {
        let name = name.trim();
        if price <= Decimal::ZERO {
            return Err(InvoiceError::InvalidPrice {
                item: name.to_string(),
                price,
                reason: "must be greater than 0".to_string(),
            });
        }
        let item = LineItem::new(name, price, qty)?;

        let mut items = self.items.clone();
        items.push(item);
        Ok(Session {
            items,
            pending: self.pending.clone(),
        })
    }

    pub fn with_pending(&self, pending: PendingInput) -> Session {
        Session {
            items: self.items.clone(),
            pending,
        }
    }

    /// Add the pending input as an item and clear the form
    pub fn commit_pending(&self) -> Result<Session> {
        let PendingInput { name, price, qty } = &self.pending;
        let mut next = self.add_item(name, *price, *qty)?;
        next.pending = PendingInput::default();
        Ok(next)
    }

    /// Replace the price and/or quantity of the item at `index` (0-based).
    /// Unlike `add_item`, a zero price is accepted here.
    pub fn edit_item(
        &self,
        index: usize,
        price: Option<Decimal>,
        qty: Option<u32>,
    ) -> Result<Session> {
        let current = self.item_at(index)?;
        let updated = current.with_changes(price, qty)?;

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| if i == index { updated.clone() } else { item.clone() })
            .collect();
        Ok(Session {
            items,
            pending: self.pending.clone(),
        })
    }

    /// Drop the item at `index` (0-based)
    pub fn remove_item(&self, index: usize) -> Result<Session> {
        self.item_at(index)?;

        let items = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item.clone())
            .collect();
        Ok(Session {
            items,
            pending: self.pending.clone(),
        })
    }

    pub fn clear(&self) -> Session {
        Session::default()
    }

    fn item_at(&self, index: usize) -> Result<&LineItem> {
        self.items.get(index).ok_or(InvoiceError::InvalidItemIndex {
            index: index + 1,
            count: self.items.len(),
        })
    }
}
