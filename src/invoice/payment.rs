use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::totals::{round_cents, InvoiceTotals};
use crate::error::{InvoiceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Debit => "Debit",
            PaymentMethod::Credit => "Credit",
        };
        f.write_str(name)
    }
}

/// How the invoice was paid. Cash payments carry the tendered amount and
/// the change handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method")]
pub enum PaymentInfo {
    Cash { cash_given: Decimal, change: Decimal },
    Debit,
    Credit,
}

impl PaymentInfo {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentInfo::Cash { .. } => PaymentMethod::Cash,
            PaymentInfo::Debit => PaymentMethod::Debit,
            PaymentInfo::Credit => PaymentMethod::Credit,
        }
    }
}

/// Check that the payment covers the invoice and work out the change.
///
/// Cash tendered is taken to the cent and compared against the amount due
/// (total rounded to cents). When nothing is due, a missing cash amount is
/// treated as zero.
pub fn settle_payment(
    method: PaymentMethod,
    cash_given: Option<Decimal>,
    totals: &InvoiceTotals,
) -> Result<PaymentInfo> {
    match method {
        PaymentMethod::Debit => Ok(PaymentInfo::Debit),
        PaymentMethod::Credit => Ok(PaymentInfo::Credit),
        PaymentMethod::Cash => {
            let due = totals.amount_due();
            let given = match cash_given {
                Some(amount) if amount < Decimal::ZERO => {
                    return Err(InvoiceError::NegativeCash(amount))
                }
                Some(amount) => round_cents(amount),
                None if due > Decimal::ZERO => {
                    return Err(InvoiceError::InsufficientCash {
                        due,
                        given: Decimal::ZERO,
                    })
                }
                None => Decimal::ZERO,
            };

            if given < due {
                return Err(InvoiceError::InsufficientCash { due, given });
            }

            Ok(PaymentInfo::Cash {
                cash_given: given,
                change: given - due,
            })
        }
    }
}
