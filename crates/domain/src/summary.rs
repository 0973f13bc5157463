//! Daily sales summary.

use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

/// The product that sold the most units in a period.
///
/// The default value (empty name, zero quantity) means nothing was sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    pub name: String,
    pub quantity_sold: u64,
}

/// Revenue, transaction count and best seller for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_revenue: Money,
    pub total_transaction_count: u64,
    pub best_seller: BestSeller,
}

impl DailySummary {
    /// Returns true when no transaction fell in the period.
    pub fn is_empty(&self) -> bool {
        self.total_transaction_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_all_zeros() {
        let summary = DailySummary::default();
        assert!(summary.is_empty());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total_revenue": 0,
                "total_transaction_count": 0,
                "best_seller": { "name": "", "quantity_sold": 0 }
            })
        );
    }
}
