//! Dashboard resource service.
//!
//! One function per backend operation. Every call returns the adapter's
//! [`ApiResponse`] as-is; callers take `.data` themselves.

use emporium_core::{
    BulkChanges, BulkUpdateResult, Category, CategoryId, DashboardStats, Page, Product, ProductId,
    PromoteResult, Review, ReviewId, User, UserId,
};
use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use crate::adapter::{ApiClient, ApiResponse, Body};
use crate::error::ApiError;
use crate::form::{CategoryDraft, ProductDraft};
use crate::query::ListOptions;

const STATS_PATH: &str = "/products/dashboard/stats/";
const PRODUCTS_PATH: &str = "/products/dashboard/products/";
const PRODUCT_CREATE_PATH: &str = "/products/dashboard/products/create/";
const PRODUCT_BULK_UPDATE_PATH: &str = "/products/dashboard/products/bulk-update/";
const CATEGORIES_PATH: &str = "/products/dashboard/categories/";
const REVIEWS_PATH: &str = "/products/dashboard/reviews/";
const USERS_PATH: &str = "/users/admin/users/";
const MAKE_ADMIN_PATH: &str = "/users/admin/make-admin/";

/// Typed access to the admin dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    /// Wrap a configured adapter.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying adapter.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Headline numbers for the overview page.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<ApiResponse<DashboardStats>, ApiError> {
        self.client.get(STATS_PATH).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// One page of products matching `options` (`search`, `category`,
    /// `stock`, `sort`, `page`).
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self, options), fields(query = %options.to_query_string()))]
    pub async fn products(
        &self,
        options: &ListOptions,
    ) -> Result<ApiResponse<Page<Product>>, ApiError> {
        self.client.get(&options.append_to(PRODUCTS_PATH)).await
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<ApiResponse<Product>, ApiError> {
        self.client.get(&product_path(id)).await
    }

    /// Create a product from a multipart form.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the draft is incomplete, otherwise
    /// propagates the adapter's error unchanged.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> Result<ApiResponse<Product>, ApiError> {
        draft.validate()?;
        let form = draft.to_multipart()?;
        self.client
            .send(Method::POST, PRODUCT_CREATE_PATH, Body::Multipart(form))
            .await
    }

    /// Replace a product's fields from a multipart form. Without an image
    /// the stored image is kept.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the draft is incomplete, otherwise
    /// propagates the adapter's error unchanged.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<ApiResponse<Product>, ApiError> {
        draft.validate()?;
        let form = draft.to_multipart()?;
        self.client
            .send(Method::PUT, &product_path(id), Body::Multipart(form))
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<ApiResponse<()>, ApiError> {
        self.client.delete(&product_path(id)).await
    }

    /// Apply the same changes to several products at once.
    ///
    /// The backend validates the whole batch before writing, so either every
    /// product is updated or none is.
    ///
    /// # Errors
    ///
    /// Returns a validation error without sending anything when `ids` is
    /// empty, otherwise propagates the adapter's error unchanged.
    #[instrument(skip(self, changes), fields(count = ids.len()))]
    pub async fn bulk_update_products(
        &self,
        ids: &[ProductId],
        changes: &BulkChanges,
    ) -> Result<ApiResponse<BulkUpdateResult>, ApiError> {
        if ids.is_empty() {
            return Err(ApiError::InvalidRequest(
                "at least one product id is required".to_owned(),
            ));
        }
        let body = json!({
            "product_ids": ids,
            "updates": changes,
        });
        self.client.post_json(PRODUCT_BULK_UPDATE_PATH, body).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Every category, with product counts.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<ApiResponse<Vec<Category>>, ApiError> {
        self.client.get(CATEGORIES_PATH).await
    }

    /// A single category.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<ApiResponse<Category>, ApiError> {
        self.client.get(&category_path(id)).await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, otherwise propagates the
    /// adapter's error unchanged.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> Result<ApiResponse<Category>, ApiError> {
        draft.validate()?;
        self.client.post_json(CATEGORIES_PATH, to_json(draft)?).await
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, otherwise propagates the
    /// adapter's error unchanged.
    #[instrument(skip(self, draft), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<ApiResponse<Category>, ApiError> {
        draft.validate()?;
        self.client.put_json(&category_path(id), to_json(draft)?).await
    }

    /// Delete a category. The backend refuses while products still use it.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<ApiResponse<()>, ApiError> {
        self.client.delete(&category_path(id)).await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// One page of reviews matching `options` (`search`, `rating`,
    /// `product`, `page`).
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self, options), fields(query = %options.to_query_string()))]
    pub async fn reviews(&self, options: &ListOptions) -> Result<ApiResponse<Page<Review>>, ApiError> {
        self.client.get(&options.append_to(REVIEWS_PATH)).await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<ApiResponse<()>, ApiError> {
        self.client
            .delete(&format!("{REVIEWS_PATH}{id}/delete/"))
            .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every registered user.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<ApiResponse<Vec<User>>, ApiError> {
        self.client.get(USERS_PATH).await
    }

    /// Grant admin rights to a user.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn make_user_admin(&self, id: UserId) -> Result<ApiResponse<PromoteResult>, ApiError> {
        self.client
            .post_json(MAKE_ADMIN_PATH, json!({ "user_id": id }))
            .await
    }
}

fn product_path(id: ProductId) -> String {
    format!("{PRODUCTS_PATH}{id}/")
}

fn category_path(id: CategoryId) -> String {
    format!("{CATEGORIES_PATH}{id}/")
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::InvalidRequest(format!("invalid body: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::endpoint::ApiOrigin;
    use crate::error::ErrorKind;
    use crate::session::Session;

    fn api() -> DashboardApi {
        DashboardApi::new(ApiClient::new(ApiOrigin::local(), Session::anonymous()).unwrap())
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            product_path(ProductId::new(7)),
            "/products/dashboard/products/7/"
        );
        assert_eq!(
            category_path(CategoryId::new(3)),
            "/products/dashboard/categories/3/"
        );
    }

    #[tokio::test]
    async fn test_bulk_update_rejects_empty_ids() {
        let changes = BulkChanges {
            stock: Some(5),
            ..BulkChanges::default()
        };
        let err = api().bulk_update_products(&[], &changes).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_category_rejects_blank_name() {
        let err = api()
            .create_category(&CategoryDraft::named("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.server_message().as_deref(), Some("name is required"));
    }
}
