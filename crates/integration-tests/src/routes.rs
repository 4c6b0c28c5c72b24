//! Route handlers of the stub backend.
//!
//! Paths, status codes and error bodies follow the store backend's
//! dashboard endpoints closely enough for the client to be exercised over
//! real HTTP.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{
        StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{Datelike, Utc};
use emporium_client::TUNNEL_BYPASS_HEADER;
use emporium_core::{
    Category, CategoryId, DashboardStats, Page, Price, Product, ProductId, ProductSort, Rating,
    ReviewId, StockFilter, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::auth::RequireStaff;
use crate::state::StubState;
use crate::store::{LOW_STOCK_THRESHOLD, PASSWORD, RecordedRequest, Store, UploadedImage};

const API_PREFIX: &str = "/api";
const DEFAULT_PAGE_SIZE: usize = 20;
const STRIPE_PUBLISHABLE_KEY: &str = "pk_test_stub";

/// Build the stub router with request recording.
pub fn router(state: StubState) -> Router {
    let api = Router::new()
        .route("/users/login/", post(login))
        .route("/payments/stripe-config/", get(stripe_config))
        .route("/products/dashboard/stats/", get(stats))
        .route("/products/dashboard/products/", get(list_products))
        .route("/products/dashboard/products/create/", post(create_product))
        .route(
            "/products/dashboard/products/bulk-update/",
            post(bulk_update_products),
        )
        .route(
            "/products/dashboard/products/{id}/",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/products/dashboard/categories/",
            get(list_categories).post(create_category),
        )
        .route(
            "/products/dashboard/categories/{id}/",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/products/dashboard/reviews/", get(list_reviews))
        .route(
            "/products/dashboard/reviews/{id}/delete/",
            delete(delete_review),
        )
        .route("/users/admin/users/", get(list_users))
        .route("/users/admin/make-admin/", post(make_admin));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn record_request(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let uri = request.uri();

        RecordedRequest {
            method: request.method().to_string(),
            path: uri
                .path()
                .strip_prefix(API_PREFIX)
                .unwrap_or_else(|| uri.path())
                .to_owned(),
            query: uri.query().map(str::to_owned),
            authorization: header(AUTHORIZATION.as_str()),
            tunnel_header: header(TUNNEL_BYPASS_HEADER),
            content_type: header(CONTENT_TYPE.as_str()),
        }
    };

    state.record(recorded).await;

    next.run(request).await
}

// ============================================================================
// Responses
// ============================================================================

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn field_error(field: &str, message: &str) -> Response {
    let mut body = Map::new();
    body.insert(field.to_owned(), json!([message]));
    (StatusCode::BAD_REQUEST, Json(Value::Object(body))).into_response()
}

fn paginate<T: Serialize>(
    items: Vec<T>,
    page: Option<usize>,
    page_size: Option<usize>,
    path: &str,
) -> Response {
    let size = page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let count = items.len();
    let start = (page - 1).saturating_mul(size);
    if page > 1 && start >= count {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Invalid page." })))
            .into_response();
    }

    let results: Vec<T> = items.into_iter().skip(start).take(size).collect();
    let link = |n: usize| format!("{API_PREFIX}{path}?page={n}");
    Json(Page {
        count: u64::try_from(count).unwrap_or(u64::MAX),
        next: (start + size < count).then(|| link(page + 1)),
        previous: (page > 1).then(|| link(page - 1)),
        results,
    })
    .into_response()
}

// ============================================================================
// Public endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

async fn login(State(state): State<StubState>, Json(input): Json<LoginInput>) -> Response {
    let mut store = state.store().await;
    let Some(user) = store
        .users
        .iter()
        .find(|u| u.email == input.email && u.is_active)
        .cloned()
    else {
        return invalid_credentials();
    };
    if input.password != PASSWORD {
        return invalid_credentials();
    }

    let token = format!("token-{}", user.id);
    store.tokens.insert(token.clone(), user.id);
    Json(json!({ "access": token, "user": user })).into_response()
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "No active account found with the given credentials" })),
    )
        .into_response()
}

async fn stripe_config() -> Json<Value> {
    Json(json!({ "publishable_key": STRIPE_PUBLISHABLE_KEY }))
}

// ============================================================================
// Stats
// ============================================================================

#[instrument(skip_all)]
async fn stats(_staff: RequireStaff, State(state): State<StubState>) -> Json<DashboardStats> {
    let store = state.store().await;
    let now = Utc::now();
    let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);

    let ratings: Vec<f64> = store
        .reviews
        .iter()
        .map(|r| f64::from(r.rating.value()))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    Json(DashboardStats {
        total_products: count(store.products.len()),
        total_categories: count(store.categories.len()),
        total_reviews: count(store.reviews.len()),
        products_with_stock: count(store.products.iter().filter(|p| p.stock > 0).count()),
        products_out_of_stock: count(store.products.iter().filter(|p| p.stock == 0).count()),
        average_rating,
        recent_products: count(
            store
                .products
                .iter()
                .filter_map(|p| p.date_added)
                .filter(|d| d.year() == now.year() && d.month() == now.month())
                .count(),
        ),
    })
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProductQuery {
    search: Option<String>,
    category: Option<i64>,
    stock: Option<String>,
    sort: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
}

fn matches_search(store: &Store, product: &Product, search: &str) -> bool {
    let needle = search.to_lowercase();
    let category_name = product
        .category
        .and_then(|id| store.category(id))
        .map(|c| c.name.to_lowercase())
        .unwrap_or_default();
    product.title.to_lowercase().contains(&needle)
        || product.description.to_lowercase().contains(&needle)
        || category_name.contains(&needle)
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::TitleAsc => products.sort_by(|a, b| a.title.cmp(&b.title)),
        ProductSort::TitleDesc => products.sort_by(|a, b| b.title.cmp(&a.title)),
        ProductSort::PriceAsc => products.sort_by_key(|p| p.unit_price),
        ProductSort::PriceDesc => products.sort_by(|a, b| b.unit_price.cmp(&a.unit_price)),
        ProductSort::StockAsc => products.sort_by_key(|p| p.stock),
        ProductSort::StockDesc => products.sort_by(|a, b| b.stock.cmp(&a.stock)),
        ProductSort::Oldest => products.sort_by_key(|p| p.date_added),
        ProductSort::Newest => products.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
    }
}

#[instrument(skip_all)]
async fn list_products(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Query(query): Query<ProductQuery>,
) -> Response {
    let store = state.store().await;

    let stock = query
        .stock
        .as_deref()
        .and_then(|s| StockFilter::from_str(s).ok());
    let mut products: Vec<Product> = store
        .products
        .iter()
        .filter(|p| {
            query
                .search
                .as_deref()
                .is_none_or(|s| matches_search(&store, p, s))
        })
        .filter(|p| {
            query
                .category
                .is_none_or(|id| p.category == Some(CategoryId::new(id)))
        })
        .filter(|p| match stock {
            Some(StockFilter::InStock) => p.stock > 0,
            Some(StockFilter::OutOfStock) => p.stock == 0,
            Some(StockFilter::LowStock) => (1..=LOW_STOCK_THRESHOLD).contains(&p.stock),
            None => true,
        })
        .map(|p| store.present_product(p))
        .collect();

    let sort = query
        .sort
        .as_deref()
        .and_then(|s| ProductSort::from_str(s).ok())
        .unwrap_or_default();
    sort_products(&mut products, sort);

    paginate(
        products,
        query.page,
        query.page_size,
        "/products/dashboard/products/",
    )
}

#[instrument(skip_all)]
async fn get_product(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let store = state.store().await;
    store.product(ProductId::new(id)).map_or_else(not_found, |p| {
        Json(store.present_product(p)).into_response()
    })
}

/// Fields read from a product form. Every field is optional here; the
/// handlers decide which are required.
#[derive(Debug, Default)]
struct ProductForm {
    title: Option<String>,
    description: Option<String>,
    unit_price: Option<String>,
    stock: Option<String>,
    category: Option<String>,
    image: Option<(String, Option<String>, usize)>,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, Response> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
            form.image = Some((file_name, content_type, bytes.len()));
            continue;
        }

        let value = field.text().await.map_err(IntoResponse::into_response)?;
        match name.as_str() {
            "title" => form.title = Some(value),
            "description" => form.description = Some(value),
            "unit_price" => form.unit_price = Some(value),
            "stock" => form.stock = Some(value),
            "category" => form.category = Some(value),
            _ => {}
        }
    }
    Ok(form)
}

/// Apply `form` to `product`. With `require_all`, missing required fields
/// are rejected as they would be on create.
fn apply_form(
    store: &mut Store,
    product: &mut Product,
    form: ProductForm,
    require_all: bool,
) -> Result<(), Response> {
    for (field, value) in [
        ("title", &form.title),
        ("description", &form.description),
        ("unit_price", &form.unit_price),
        ("category", &form.category),
    ] {
        match value {
            Some(v) if v.trim().is_empty() => {
                return Err(field_error(field, "This field may not be blank."));
            }
            None if require_all => return Err(field_error(field, "This field is required.")),
            _ => {}
        }
    }

    if let Some(title) = form.title {
        product.title = title;
    }
    if let Some(description) = form.description {
        product.description = description;
    }
    if let Some(raw) = form.unit_price {
        product.unit_price = Price::parse(&raw)
            .map_err(|_| field_error("unit_price", "A valid number is required."))?;
    }
    if let Some(raw) = form.stock {
        product.stock = raw
            .trim()
            .parse()
            .map_err(|_| field_error("stock", "A valid integer is required."))?;
    }
    if let Some(raw) = form.category {
        let id = raw
            .trim()
            .parse::<i64>()
            .ok()
            .map(CategoryId::new)
            .filter(|id| store.category(*id).is_some())
            .ok_or_else(|| {
                field_error("category", &format!("Invalid pk \"{raw}\" - object does not exist."))
            })?;
        product.category = Some(id);
    }
    if let Some((file_name, content_type, size)) = form.image {
        product.image = Some(format!("/media/products/{file_name}"));
        store.uploads.push(UploadedImage {
            product: product.id,
            file_name,
            content_type,
            size,
        });
    }
    Ok(())
}

#[instrument(skip_all)]
async fn create_product(
    _staff: RequireStaff,
    State(state): State<StubState>,
    multipart: Multipart,
) -> Response {
    let form = match read_product_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let mut store = state.store().await;
    let id = ProductId::new(store.next_id());
    let mut product = Product {
        id,
        title: String::new(),
        description: String::new(),
        unit_price: Price::default(),
        image: None,
        stock: 0,
        date_added: Some(Utc::now()),
        category: None,
        category_name: None,
        average_rating: None,
        review_count: 0,
        is_low_stock: false,
        is_out_of_stock: false,
    };
    if let Err(response) = apply_form(&mut store, &mut product, form, true) {
        return response;
    }

    let body = store.present_product(&product);
    store.products.push(product);
    (StatusCode::CREATED, Json(body)).into_response()
}

#[instrument(skip_all)]
async fn update_product(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let form = match read_product_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let mut store = state.store().await;
    let Some(mut product) = store.product(ProductId::new(id)).cloned() else {
        return not_found();
    };
    if let Err(response) = apply_form(&mut store, &mut product, form, false) {
        return response;
    }

    let body = store.present_product(&product);
    if let Some(slot) = store.products.iter_mut().find(|p| p.id == product.id) {
        *slot = product;
    }
    Json(body).into_response()
}

#[instrument(skip_all)]
async fn delete_product(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let mut store = state.store().await;
    let id = ProductId::new(id);
    if store.product(id).is_none() {
        return not_found();
    }
    store.products.retain(|p| p.id != id);
    store.reviews.retain(|r| r.product_id != id);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
struct BulkUpdateInput {
    #[serde(default)]
    product_ids: Vec<i64>,
    #[serde(default)]
    updates: Map<String, Value>,
}

const BULK_FIELDS: [&str; 3] = ["stock", "unit_price", "category"];

#[instrument(skip_all)]
async fn bulk_update_products(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Json(input): Json<BulkUpdateInput>,
) -> Response {
    if input.product_ids.is_empty() {
        return error(StatusCode::BAD_REQUEST, "product_ids is required");
    }
    if input.updates.is_empty() {
        return error(StatusCode::BAD_REQUEST, "updates is required");
    }
    if let Some(field) = input.updates.keys().find(|k| !BULK_FIELDS.contains(&k.as_str())) {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("Field '{field}' cannot be bulk updated"),
        );
    }

    let mut store = state.store().await;
    let ids: Vec<ProductId> = input.product_ids.into_iter().map(ProductId::new).collect();
    if ids.iter().any(|id| store.product(*id).is_none()) {
        return error(StatusCode::BAD_REQUEST, "Some products were not found");
    }

    let stock = match input.updates.get("stock") {
        None => None,
        Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => return field_error("stock", "A valid integer is required."),
        },
    };
    let unit_price = match input.updates.get("unit_price") {
        None => None,
        Some(v) => match decimal_from(v).filter(|d| !d.is_sign_negative()) {
            Some(d) => Some(Price::new(d)),
            None => return field_error("unit_price", "A valid number is required."),
        },
    };
    let category = match input.updates.get("category") {
        None => None,
        Some(v) => match v
            .as_i64()
            .map(CategoryId::new)
            .filter(|id| store.category(*id).is_some())
        {
            Some(id) => Some(id),
            None => return field_error("category", "Invalid category."),
        },
    };

    let mut updated = 0_u64;
    for product in store.products.iter_mut().filter(|p| ids.contains(&p.id)) {
        if let Some(stock) = stock {
            product.stock = stock;
        }
        if let Some(price) = unit_price {
            product.unit_price = price;
        }
        if let Some(category) = category {
            product.category = Some(category);
        }
        updated += 1;
    }

    Json(json!({
        "message": format!("Successfully updated {updated} products"),
        "updated_count": updated,
    }))
    .into_response()
}

fn decimal_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .map(|d| d.round_dp(2)),
        _ => None,
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Deserialize)]
struct CategoryInput {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
}

fn validate_category(store: &Store, input: &CategoryInput, id: Option<CategoryId>) -> Result<(), Response> {
    if input.name.trim().is_empty() {
        return Err(field_error("name", "This field may not be blank."));
    }
    let duplicate = store
        .categories
        .iter()
        .any(|c| c.name.eq_ignore_ascii_case(input.name.trim()) && Some(c.id) != id);
    if duplicate {
        return Err(field_error("name", "category with this name already exists."));
    }
    Ok(())
}

#[instrument(skip_all)]
async fn list_categories(_staff: RequireStaff, State(state): State<StubState>) -> Json<Vec<Category>> {
    let store = state.store().await;
    let mut categories: Vec<Category> = store
        .categories
        .iter()
        .map(|c| store.present_category(c))
        .collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Json(categories)
}

#[instrument(skip_all)]
async fn get_category(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let store = state.store().await;
    store.category(CategoryId::new(id)).map_or_else(not_found, |c| {
        Json(store.present_category(c)).into_response()
    })
}

#[instrument(skip_all)]
async fn create_category(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Json(input): Json<CategoryInput>,
) -> Response {
    let mut store = state.store().await;
    if let Err(response) = validate_category(&store, &input, None) {
        return response;
    }

    let category = Category {
        id: CategoryId::new(store.next_id()),
        name: input.name.trim().to_owned(),
        description: input.description,
        product_count: None,
    };
    let body = store.present_category(&category);
    store.categories.push(category);
    (StatusCode::CREATED, Json(body)).into_response()
}

#[instrument(skip_all)]
async fn update_category(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
    Json(input): Json<CategoryInput>,
) -> Response {
    let mut store = state.store().await;
    let id = CategoryId::new(id);
    if store.category(id).is_none() {
        return not_found();
    }
    if let Err(response) = validate_category(&store, &input, Some(id)) {
        return response;
    }

    let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
        return not_found();
    };
    category.name = input.name.trim().to_owned();
    category.description = input.description;
    let updated = category.clone();
    Json(store.present_category(&updated)).into_response()
}

#[instrument(skip_all)]
async fn delete_category(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let mut store = state.store().await;
    let id = CategoryId::new(id);
    if store.category(id).is_none() {
        return not_found();
    }
    if store.product_count(id) > 0 {
        return error(
            StatusCode::BAD_REQUEST,
            "Cannot delete category with existing products",
        );
    }
    store.categories.retain(|c| c.id != id);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReviewQuery {
    search: Option<String>,
    rating: Option<String>,
    product: Option<i64>,
    page: Option<usize>,
    page_size: Option<usize>,
}

#[instrument(skip_all)]
async fn list_reviews(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Query(query): Query<ReviewQuery>,
) -> Response {
    let store = state.store().await;

    // Out-of-range ratings are ignored rather than rejected.
    let rating = query
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse::<i64>().ok())
        .and_then(|r| Rating::new(r).ok());
    let needle = query.search.as_deref().map(str::to_lowercase);

    let mut reviews: Vec<_> = store
        .reviews
        .iter()
        .filter(|r| rating.is_none_or(|rating| r.rating == rating))
        .filter(|r| query.product.is_none_or(|id| r.product_id == ProductId::new(id)))
        .filter(|r| {
            needle.as_deref().is_none_or(|n| {
                r.title.to_lowercase().contains(n) || r.content.to_lowercase().contains(n)
            })
        })
        .map(|r| store.present_review(r))
        .collect();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    paginate(
        reviews,
        query.page,
        query.page_size,
        "/products/dashboard/reviews/",
    )
}

#[instrument(skip_all)]
async fn delete_review(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Path(id): Path<i64>,
) -> Response {
    let mut store = state.store().await;
    let id = ReviewId::new(id);
    if !store.reviews.iter().any(|r| r.id == id) {
        return error(StatusCode::NOT_FOUND, "Review not found");
    }
    store.reviews.retain(|r| r.id != id);
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Users
// ============================================================================

#[instrument(skip_all)]
async fn list_users(_staff: RequireStaff, State(state): State<StubState>) -> Json<Value> {
    let store = state.store().await;
    let mut users = store.users.clone();
    users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
    Json(json!(users))
}

#[derive(Debug, Deserialize)]
struct MakeAdminInput {
    user_id: Option<i64>,
}

#[instrument(skip_all)]
async fn make_admin(
    _staff: RequireStaff,
    State(state): State<StubState>,
    Json(input): Json<MakeAdminInput>,
) -> Response {
    let Some(id) = input.user_id.map(UserId::new) else {
        return error(StatusCode::BAD_REQUEST, "user_id is required");
    };

    let mut store = state.store().await;
    let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user.is_staff = true;

    Json(json!({
        "message": format!("User {} has been made an admin", user.email),
        "user": user.clone(),
    }))
    .into_response()
}
