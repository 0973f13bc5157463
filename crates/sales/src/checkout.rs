//! Checkout engine: one request in, one committed sale out.

use std::str::FromStr;

use common::ProductId;
use domain::{
    CheckoutItem, DomainError, Money, NewTransactionDetail, Product, Quantity, Transaction,
    validate_checkout,
};
use store::{SalesStore, StoreError, UnitOfWork};

use crate::error::{Result, SalesError};

/// What a checkout does when a line asks for more units than are in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Fail the whole checkout with [`SalesError::InsufficientStock`].
    #[default]
    Reject,
    /// Decrement anyway and let stock go negative.
    AllowNegative,
}

impl StockPolicy {
    fn check(&self, product: &Product, quantity: Quantity) -> Result<()> {
        match self {
            StockPolicy::AllowNegative => Ok(()),
            StockPolicy::Reject if product.stock < i64::from(quantity.get()) => {
                Err(SalesError::InsufficientStock {
                    product_id: product.id,
                    requested: quantity.get(),
                    available: product.stock,
                })
            }
            StockPolicy::Reject => Ok(()),
        }
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(StockPolicy::Reject),
            "allow-negative" | "allow_negative" => Ok(StockPolicy::AllowNegative),
            other => Err(format!(
                "unknown stock policy '{other}' (expected 'reject' or 'allow-negative')"
            )),
        }
    }
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockPolicy::Reject => write!(f, "reject"),
            StockPolicy::AllowNegative => write!(f, "allow-negative"),
        }
    }
}

/// Converts a list of checkout items into a committed [`Transaction`].
///
/// The engine owns no storage; it drives a [`UnitOfWork`] opened on the
/// store it was built with, so it works the same over every backend.
pub struct CheckoutEngine<S: SalesStore> {
    store: S,
    policy: StockPolicy,
}

impl<S: SalesStore> CheckoutEngine<S> {
    /// Creates an engine with the default stock policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, StockPolicy::default())
    }

    /// Creates an engine with an explicit stock policy.
    pub fn with_policy(store: S, policy: StockPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the active stock policy.
    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Returns the store this engine writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sells `items` as one transaction.
    ///
    /// Items are processed in input order: the first missing product is the
    /// one reported, and details keep the submission order. On any error no
    /// stock change, transaction or detail is left behind.
    #[tracing::instrument(skip(self, items), fields(item_count = items.len(), policy = %self.policy))]
    pub async fn checkout(&self, items: &[CheckoutItem]) -> Result<Transaction> {
        metrics::counter!("checkout_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run(items).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(transaction) => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    total_amount = %transaction.total_amount,
                    lines = transaction.details.len(),
                    "checkout committed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_failed_total").increment(1);
                tracing::warn!(error = %e, "checkout rolled back");
            }
        }
        result
    }

    async fn run(&self, items: &[CheckoutItem]) -> Result<Transaction> {
        validate_checkout(items)?;

        let mut unit = self.store.begin().await?;

        let mut product_ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        unit.lock_products(&product_ids).await?;

        // 1. Price and reserve each line in input order
        let mut total_amount = Money::zero();
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = unit
                .product(item.product_id)
                .await
                .map_err(|e| missing_product(e, item.product_id))?;

            let subtotal = product
                .price
                .checked_mul(item.quantity)
                .ok_or(DomainError::AmountOverflow {
                    product_id: product.id,
                })?;
            total_amount = total_amount
                .checked_add(subtotal)
                .ok_or(DomainError::AmountOverflow {
                    product_id: product.id,
                })?;

            self.policy.check(&product, item.quantity)?;
            let remaining = unit
                .decrement_stock(product.id, item.quantity)
                .await
                .map_err(|e| missing_product(e, product.id))?;
            tracing::debug!(product_id = %product.id, quantity = %item.quantity, remaining, "stock decremented");

            lines.push(NewTransactionDetail {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                subtotal,
            });
        }

        // 2. Header
        let (transaction_id, created_at) = unit.insert_transaction(total_amount).await?;

        // 3. Lines, in the same order
        let mut details = Vec::with_capacity(lines.len());
        for line in lines {
            details.push(unit.insert_detail(transaction_id, line).await?);
        }

        let transaction = Transaction {
            id: transaction_id,
            total_amount,
            created_at,
            details,
        };

        if !transaction.is_consistent() || transaction.details.len() != items.len() {
            if let Err(e) = unit.rollback().await {
                tracing::error!(error = %e, "rollback after consistency violation failed");
            }
            return Err(SalesError::ConsistencyViolation(format!(
                "transaction {} total {} does not match {} detail lines summing to {}",
                transaction.id,
                transaction.total_amount,
                transaction.details.len(),
                transaction.details_total()
            )));
        }

        // 4. Commit
        unit.commit().await?;
        Ok(transaction)
    }
}

fn missing_product(e: StoreError, product_id: ProductId) -> SalesError {
    if e.is_not_found() {
        SalesError::ProductNotFound(product_id)
    } else {
        SalesError::Store(e)
    }
}
