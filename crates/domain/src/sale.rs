//! Sale records and checkout input.

use chrono::{DateTime, Utc};
use common::{DetailId, ProductId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Money, Quantity};

/// One requested line of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CheckoutItem {
    /// Creates a checkout line, rejecting non-positive quantities.
    pub fn new(product_id: ProductId, quantity: i64) -> Result<Self, DomainError> {
        let quantity = Quantity::new(quantity).ok_or(DomainError::InvalidQuantity {
            product_id,
            quantity,
        })?;
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// Rejects a checkout that has nothing to sell.
pub fn validate_checkout(items: &[CheckoutItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyCheckout);
    }
    Ok(())
}

/// A priced line waiting to be stamped with its transaction.
///
/// The product name is copied at sale time so the record stays readable
/// after the product is renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransactionDetail {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub subtotal: Money,
}

impl NewTransactionDetail {
    /// Attaches the ids assigned by the store.
    pub fn into_detail(self, id: DetailId, transaction_id: TransactionId) -> TransactionDetail {
        TransactionDetail {
            id,
            transaction_id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            subtotal: self.subtotal,
        }
    }
}

/// A persisted line of a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: DetailId,
    pub transaction_id: TransactionId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub subtotal: Money,
}

/// A committed sale and its lines in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Sum of the line subtotals.
    pub fn details_total(&self) -> Money {
        self.details.iter().map(|d| d.subtotal).sum()
    }

    /// True when the header total matches the lines and every line points
    /// back at this transaction.
    pub fn is_consistent(&self) -> bool {
        self.total_amount == self.details_total()
            && self.details.iter().all(|d| d.transaction_id == self.id)
    }
}
