//! Daily sales summary for the point-of-sale backend.
//!
//! - [`ReportClock`] decides where a calendar day starts and ends
//! - [`ReportAggregator`] reads committed transactions for that day and folds
//!   them into a [`domain::DailySummary`]

pub mod aggregator;
pub mod clock;
pub mod error;

pub use aggregator::{ReportAggregator, summarize};
pub use clock::ReportClock;
pub use error::{ReportError, Result};
