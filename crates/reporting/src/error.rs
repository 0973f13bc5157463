//! Reporting error types.

use thiserror::Error;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    /// The summed revenue does not fit the money type.
    #[error("Revenue overflow while summing {count} transactions")]
    RevenueOverflow { count: u64 },

    /// The report time zone cannot be parsed.
    #[error("Invalid UTC offset '{0}' (expected +HH:MM or -HH:MM)")]
    InvalidOffset(String),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportError>;
