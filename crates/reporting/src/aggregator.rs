//! Daily summary aggregation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::ProductId;
use domain::{BestSeller, DailySummary, Money, Transaction};
use store::SalesStore;

use crate::clock::ReportClock;
use crate::error::{ReportError, Result};

/// Builds [`DailySummary`] values from committed transactions.
pub struct ReportAggregator<S: SalesStore> {
    store: S,
    clock: ReportClock,
}

impl<S: SalesStore> ReportAggregator<S> {
    /// Creates an aggregator reporting in server local time.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, ReportClock::Local)
    }

    pub fn with_clock(store: S, clock: ReportClock) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> ReportClock {
        self.clock
    }

    /// Summarizes the current calendar day.
    pub async fn summary_for_today(&self) -> Result<DailySummary> {
        self.summary_for(Utc::now()).await
    }

    /// Summarizes the calendar day containing `now`.
    #[tracing::instrument(skip(self))]
    pub async fn summary_for(&self, now: DateTime<Utc>) -> Result<DailySummary> {
        let (from, to) = self.clock.day_bounds(now);
        let started = std::time::Instant::now();

        let transactions = self.store.transactions_between(from, to).await?;
        let summary = summarize(&transactions)?;

        metrics::histogram!("report_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::debug!(
            %from,
            %to,
            transactions = summary.total_transaction_count,
            revenue = %summary.total_revenue,
            "daily summary computed"
        );
        Ok(summary)
    }
}

struct ProductTally {
    name: String,
    quantity: u64,
}

/// Folds transactions into a summary.
///
/// `transactions` must be in storage order (id ascending, details by id).
/// The best seller is the product with the most units; on a tie the one
/// seen first wins. Its name is taken from the first detail line seen.
pub fn summarize(transactions: &[Transaction]) -> Result<DailySummary> {
    let mut total_revenue = Money::zero();
    let mut order: Vec<ProductId> = Vec::new();
    let mut tallies: HashMap<ProductId, ProductTally> = HashMap::new();

    for (i, transaction) in transactions.iter().enumerate() {
        total_revenue = total_revenue
            .checked_add(transaction.total_amount)
            .ok_or(ReportError::RevenueOverflow {
                count: i as u64 + 1,
            })?;

        for detail in &transaction.details {
            let tally = tallies.entry(detail.product_id).or_insert_with(|| {
                order.push(detail.product_id);
                ProductTally {
                    name: detail.product_name.clone(),
                    quantity: 0,
                }
            });
            tally.quantity += u64::from(detail.quantity.get());
        }
    }

    let mut best_seller = BestSeller::default();
    for product_id in &order {
        let tally = &tallies[product_id];
        if tally.quantity > best_seller.quantity_sold {
            best_seller = BestSeller {
                name: tally.name.clone(),
                quantity_sold: tally.quantity,
            };
        }
    }

    Ok(DailySummary {
        total_revenue,
        total_transaction_count: transactions.len() as u64,
        best_seller,
    })
}
