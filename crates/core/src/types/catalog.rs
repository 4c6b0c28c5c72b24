//! Catalog entities: products, categories and reviews.
//!
//! These mirror the dashboard serializers of the store backend. Fields the
//! backend derives (`category_name`, `review_count`, stock flags) default
//! when absent so older payloads still decode.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, ReviewId, UserId};
use super::price::Price;
use super::rating::Rating;

/// A product as returned by the dashboard product endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: Price,
    /// Absolute image URL, if the product has one.
    #[serde(default)]
    pub image: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    /// Computed server-side; trusted as delivered.
    #[serde(default)]
    pub is_low_stock: bool,
    /// Computed server-side; trusted as delivered.
    #[serde(default)]
    pub is_out_of_stock: bool,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of products in the category (list endpoint only).
    #[serde(default)]
    pub product_count: Option<u32>,
}

/// A customer review as shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: Rating,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Author reference; `None` for anonymous reviews.
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_title: String,
    pub created_at: DateTime<Utc>,
}

/// Field changes applied to every product in a bulk update.
///
/// The backend only accepts `stock`, `unit_price` and `category` in bulk,
/// so no other field can be expressed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Sent as a JSON number; the backend compares it numerically.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
}

impl BulkChanges {
    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stock.is_none() && self.unit_price.is_none() && self.category.is_none()
    }
}

/// Response of the bulk update endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResult {
    pub message: String,
    pub updated_count: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_decodes_dashboard_payload() {
        let json = r#"{
            "id": 5,
            "title": "Mango Jam",
            "description": "Sweet",
            "unit_price": "4.50",
            "image": null,
            "stock": 3,
            "date_added": "2025-03-01T10:00:00Z",
            "category": 2,
            "category_name": "Preserves",
            "average_rating": 4.5,
            "review_count": 2,
            "is_low_stock": true,
            "is_out_of_stock": false
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.unit_price.to_string(), "$4.50");
        assert!(product.is_low_stock);
        assert_eq!(product.category, Some(CategoryId::new(2)));
    }

    #[test]
    fn test_product_tolerates_missing_derived_fields() {
        let json = r#"{"id": 1, "title": "Tea", "unit_price": "2.00", "stock": 0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.review_count, 0);
        assert!(!product.is_out_of_stock);
        assert!(product.category_name.is_none());
    }

    #[test]
    fn test_review_rejects_bad_rating() {
        let json = r#"{"id": 1, "rating": 7, "product_id": 1, "created_at": "2025-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Review>(json).is_err());
    }

    #[test]
    fn test_bulk_changes_serialize_only_set_fields() {
        let changes = BulkChanges {
            stock: Some(10),
            unit_price: Some(Decimal::new(1250, 2)),
            category: None,
        };
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value, serde_json::json!({"stock": 10, "unit_price": 12.5}));
        assert!(BulkChanges::default().is_empty());
        assert!(!changes.is_empty());
    }
}
