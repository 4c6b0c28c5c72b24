//! Integration tests for the dashboard resource service against the stub
//! backend.

use emporium_client::{CategoryDraft, ErrorKind, ImageUpload, ListOptions, ProductDraft, StatusCode};
use emporium_core::{BulkChanges, CategoryId, Price, ProductId};
use emporium_integration_tests::StubBackend;
use rust_decimal::Decimal;

fn titles(page: &emporium_core::Page<emporium_core::Product>) -> Vec<&str> {
    page.results.iter().map(|p| p.title.as_str()).collect()
}

// ============================================================================
// Query encoding
// ============================================================================

#[tokio::test]
async fn test_empty_filters_are_dropped_and_values_encoded() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let options = ListOptions::new()
        .set("search", "fig & jam")
        .set("category", "")
        .set("stock", "")
        .set("sort", "-title");
    api.products(&options).await.expect("Failed to list products");

    let options = ListOptions::new().set("search", "").set("stock", "");
    api.products(&options).await.expect("Failed to list products");

    let queries: Vec<Option<String>> = backend
        .requests_to("/products/dashboard/products/")
        .await
        .into_iter()
        .map(|r| r.query)
        .collect();
    assert_eq!(
        queries,
        vec![Some("search=fig+%26+jam&sort=-title".to_string()), None]
    );
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_filters() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let page = api
        .products(&ListOptions::new().set("search", "jam"))
        .await
        .expect("Search failed")
        .data;
    assert_eq!(titles(&page), vec!["Fig Jam", "Mango Jam"]);

    let page = api
        .products(&ListOptions::new().set("stock", "low_stock"))
        .await
        .expect("Stock filter failed")
        .data;
    assert_eq!(titles(&page), vec!["Mango Jam"]);
    assert!(page.results.iter().all(|p| p.is_low_stock));

    let page = api
        .products(&ListOptions::new().set("search", "preserves").set("sort", "unit_price"))
        .await
        .expect("Category-name search failed")
        .data;
    assert_eq!(titles(&page), vec!["Mango Jam", "Lemon Curd", "Fig Jam"]);
}

#[tokio::test]
async fn test_product_pagination() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let page = api
        .products(&ListOptions::new().set("page_size", "3"))
        .await
        .expect("Failed to list products")
        .data;
    assert_eq!(page.count, 4);
    assert_eq!(page.results.len(), 3);
    assert!(page.has_next());
    assert!(page.previous.is_none());
}

#[tokio::test]
async fn test_create_product_sends_multipart_with_image() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let draft = ProductDraft {
        title: "Plum Jam".to_string(),
        description: "Damson plums".to_string(),
        unit_price: Price::parse("5.25").expect("Invalid price"),
        stock: 8,
        category: Some(CategoryId::new(1)),
        image: Some(ImageUpload {
            file_name: "plum.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
    };
    let response = api.create_product(&draft).await.expect("Create failed");
    assert_eq!(response.status, StatusCode::CREATED);

    let created = response.data;
    assert_eq!(created.title, "Plum Jam");
    assert_eq!(created.unit_price, Price::parse("5.25").expect("Invalid price"));
    assert_eq!(created.category_name.as_deref(), Some("Preserves"));
    assert!(created.is_low_stock);

    let requests = backend
        .requests_to("/products/dashboard/products/create/")
        .await;
    let content_type = requests
        .first()
        .and_then(|r| r.content_type.clone())
        .expect("No content type recorded");
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let store = backend.store().await;
    let upload = store.uploads.first().expect("No image uploaded");
    assert_eq!(upload.product, created.id);
    assert_eq!(upload.file_name, "plum.png");
    assert_eq!(upload.content_type.as_deref(), Some("image/png"));
    assert_eq!(upload.size, 4);
}

#[tokio::test]
async fn test_update_product_without_image_keeps_other_fields() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let product = api
        .product(ProductId::new(3))
        .await
        .expect("Failed to fetch product")
        .data;
    let mut draft = ProductDraft::from_product(&product);
    draft.stock = 2;

    let updated = api
        .update_product(product.id, &draft)
        .await
        .expect("Update failed")
        .data;
    assert_eq!(updated.stock, 2);
    assert_eq!(updated.title, "Sourdough Loaf");
    assert!(backend.store().await.uploads.is_empty());
}

#[tokio::test]
async fn test_create_product_server_validation() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let draft = ProductDraft {
        title: "Ghost".to_string(),
        description: "No such category".to_string(),
        category: Some(CategoryId::new(404)),
        ..ProductDraft::default()
    };
    let err = api.create_product(&draft).await.expect_err("Create should fail");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(
        err.server_message()
            .expect("No server message")
            .starts_with("category: Invalid pk")
    );
}

#[tokio::test]
async fn test_bulk_update() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let changes = BulkChanges {
        stock: Some(7),
        unit_price: Some(Decimal::new(325, 2)),
        category: None,
    };
    let result = api
        .bulk_update_products(&[ProductId::new(1), ProductId::new(2)], &changes)
        .await
        .expect("Bulk update failed")
        .data;
    assert_eq!(result.message, "Successfully updated 2 products");
    assert_eq!(result.updated_count, 2);

    let store = backend.store().await;
    for id in [1, 2] {
        let product = store.product(ProductId::new(id)).expect("Product missing");
        assert_eq!(product.stock, 7);
        assert_eq!(product.unit_price, Price::parse("3.25").expect("Invalid price"));
    }
    let untouched = store.product(ProductId::new(3)).expect("Product missing");
    assert_eq!(untouched.stock, 40);
}

#[tokio::test]
async fn test_bulk_update_rejects_empty_ids_before_sending() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let changes = BulkChanges {
        stock: Some(1),
        ..BulkChanges::default()
    };
    let err = api
        .bulk_update_products(&[], &changes)
        .await
        .expect_err("Empty ids should be rejected");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_bulk_update_is_all_or_nothing() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let changes = BulkChanges {
        stock: Some(99),
        ..BulkChanges::default()
    };
    let err = api
        .bulk_update_products(&[ProductId::new(1), ProductId::new(404)], &changes)
        .await
        .expect_err("Unknown id should fail the batch");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let store = backend.store().await;
    let product = store.product(ProductId::new(1)).expect("Product missing");
    assert_eq!(product.stock, 5);
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_delete_protection() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let err = api
        .delete_category(CategoryId::new(1))
        .await
        .expect_err("Category with products should not be deleted");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.server_message().as_deref(),
        Some("Cannot delete category with existing products")
    );

    let response = api
        .delete_category(CategoryId::new(3))
        .await
        .expect("Empty category should be deleted");
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let names: Vec<String> = api
        .categories()
        .await
        .expect("Failed to list categories")
        .data
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Baked Goods", "Preserves"]);
}

#[tokio::test]
async fn test_category_create_and_update() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let created = api
        .create_category(&CategoryDraft::named("Pickles"))
        .await
        .expect("Create failed")
        .data;
    assert_eq!(created.product_count, Some(0));

    let err = api
        .create_category(&CategoryDraft::named("preserves"))
        .await
        .expect_err("Duplicate name should fail");
    assert_eq!(
        err.server_message().as_deref(),
        Some("name: category with this name already exists.")
    );

    let draft = CategoryDraft {
        name: "Pickles & Ferments".to_string(),
        description: Some("Sour things".to_string()),
    };
    let updated = api
        .update_category(created.id, &draft)
        .await
        .expect("Update failed")
        .data;
    assert_eq!(updated.name, "Pickles & Ferments");
    assert_eq!(updated.description.as_deref(), Some("Sour things"));

    let fetched = api
        .category(created.id)
        .await
        .expect("Failed to fetch category")
        .data;
    assert_eq!(fetched, updated);
}

// ============================================================================
// Reviews and users
// ============================================================================

#[tokio::test]
async fn test_review_filters() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let page = api
        .reviews(&ListOptions::new().set("product", "1"))
        .await
        .expect("Failed to list reviews")
        .data;
    let ids: Vec<i64> = page.results.iter().map(|r| r.id.as_i64()).collect();
    assert_eq!(ids, vec![2, 1]);

    let page = api
        .reviews(&ListOptions::new().set("rating", "1"))
        .await
        .expect("Failed to list reviews")
        .data;
    let review = page.results.first().expect("No review returned");
    assert_eq!(review.title, "Stale");
    assert_eq!(review.product_title, "Sourdough Loaf");
    assert_eq!(review.user_name, "Cy Customer");
}

#[tokio::test]
async fn test_make_user_admin() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let result = api
        .make_user_admin(emporium_core::UserId::new(3))
        .await
        .expect("Promote failed")
        .data;
    assert!(result.user.is_staff);
    assert_eq!(result.message, "User new@example.com has been made an admin");

    let err = api
        .make_user_admin(emporium_core::UserId::new(404))
        .await
        .expect_err("Unknown user should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
