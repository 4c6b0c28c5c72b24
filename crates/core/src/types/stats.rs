//! Dashboard statistics.

use serde::{Deserialize, Serialize};

/// Store-wide counters shown on the dashboard overview.
///
/// Every field defaults to zero so a partial payload still renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_categories: u64,
    pub total_reviews: u64,
    pub products_with_stock: u64,
    pub products_out_of_stock: u64,
    pub average_rating: f64,
    /// Products added since the first of the current month.
    pub recent_products: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_defaults() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"total_products": 12, "average_rating": 4.25}"#).unwrap();
        assert_eq!(stats.total_products, 12);
        assert_eq!(stats.total_reviews, 0);
        assert!((stats.average_rating - 4.25).abs() < f64::EPSILON);
    }
}
