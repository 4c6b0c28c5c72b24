//! In-memory data behind the stub backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use emporium_core::{
    Category, CategoryId, Price, Product, ProductId, Rating, Review, ReviewId, User, UserId,
};
use rust_decimal::Decimal;

/// Bearer token of the seeded staff user.
pub const ADMIN_TOKEN: &str = "admin-token";

/// Bearer token of the seeded customer.
pub const CUSTOMER_TOKEN: &str = "customer-token";

/// Password accepted for every seeded user.
pub const PASSWORD: &str = "password";

/// Stock at or below which an in-stock product counts as low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A request as the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path below the `/api` prefix, e.g. `/products/dashboard/stats/`.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub tunnel_header: Option<String>,
    pub content_type: Option<String>,
}

/// An image part received with a product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub product: ProductId,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Everything the backend knows.
#[derive(Debug, Clone)]
pub struct Store {
    pub users: Vec<User>,
    pub tokens: HashMap<String, UserId>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
    pub uploads: Vec<UploadedImage>,
    next_id: i64,
}

fn at(days: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600 + days * 86_400, 0).unwrap_or_default()
}

fn price(cents: i64) -> Price {
    Price::new(Decimal::new(cents, 2))
}

impl Store {
    /// A small store: three users, three categories (one empty), four
    /// products and three reviews.
    #[must_use]
    pub fn seeded() -> Self {
        let user = |id: i64, email: &str, first: &str, last: &str, staff: bool| User {
            id: UserId::new(id),
            email: email.to_owned(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            is_staff: staff,
            is_active: true,
            date_joined: Some(at(id)),
        };
        let category = |id: i64, name: &str| Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            description: None,
            product_count: None,
        };
        let product = |id: i64, title: &str, cents: i64, stock: u32, cat: i64| Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            description: format!("{title}, made in small batches"),
            unit_price: price(cents),
            image: None,
            stock,
            date_added: Some(at(id * 3)),
            category: Some(CategoryId::new(cat)),
            category_name: None,
            average_rating: None,
            review_count: 0,
            is_low_stock: false,
            is_out_of_stock: false,
        };
        let review = |id: i64, stars: i64, title: &str, product: i64, author: i64| {
            Some(Review {
                id: ReviewId::new(id),
                rating: Rating::new(stars).ok()?,
                title: title.to_owned(),
                content: format!("{title}. Would tell a friend."),
                user: Some(UserId::new(author)),
                user_name: String::new(),
                user_email: None,
                product_id: ProductId::new(product),
                product_title: String::new(),
                created_at: at(20 + id),
            })
        };

        let mut tokens = HashMap::new();
        tokens.insert(ADMIN_TOKEN.to_owned(), UserId::new(1));
        tokens.insert(CUSTOMER_TOKEN.to_owned(), UserId::new(2));

        Self {
            users: vec![
                user(1, "admin@example.com", "Ada", "Admin", true),
                user(2, "customer@example.com", "Cy", "Customer", false),
                user(3, "new@example.com", "", "", false),
            ],
            tokens,
            categories: vec![
                category(1, "Preserves"),
                category(2, "Baked Goods"),
                category(3, "Seasonal"),
            ],
            products: vec![
                product(1, "Mango Jam", 450, 5, 1),
                product(2, "Fig Jam", 600, 0, 1),
                product(3, "Sourdough Loaf", 825, 40, 2),
                product(4, "Lemon Curd", 575, 12, 1),
            ],
            reviews: [
                review(1, 5, "Lovely", 1, 2),
                review(2, 3, "Fine", 1, 3),
                review(3, 1, "Stale", 3, 2),
            ]
            .into_iter()
            .flatten()
            .collect(),
            uploads: Vec::new(),
            next_id: 100,
        }
    }

    /// Allocate an id for a new record.
    pub const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// The user a bearer token belongs to.
    #[must_use]
    pub fn user_for_token(&self, token: &str) -> Option<&User> {
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id)
    }

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// A product with the fields the serializer derives filled in.
    #[must_use]
    pub fn present_product(&self, product: &Product) -> Product {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.product_id == product.id)
            .map(|r| f64::from(r.rating.value()))
            .collect();
        let review_count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);

        Product {
            category_name: product
                .category
                .and_then(|id| self.category(id))
                .map(|c| c.name.clone()),
            average_rating: (!ratings.is_empty())
                .then(|| ratings.iter().sum::<f64>() / f64::from(review_count)),
            review_count,
            is_low_stock: (1..=LOW_STOCK_THRESHOLD).contains(&product.stock),
            is_out_of_stock: product.stock == 0,
            ..product.clone()
        }
    }

    /// A category with its product count.
    #[must_use]
    pub fn present_category(&self, category: &Category) -> Category {
        Category {
            product_count: Some(self.product_count(category.id)),
            ..category.clone()
        }
    }

    /// Number of products in a category.
    #[must_use]
    pub fn product_count(&self, id: CategoryId) -> u32 {
        let count = self
            .products
            .iter()
            .filter(|p| p.category == Some(id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// A review with its author and product names filled in.
    #[must_use]
    pub fn present_review(&self, review: &Review) -> Review {
        let author = review
            .user
            .and_then(|id| self.users.iter().find(|u| u.id == id));
        Review {
            user_name: author.map_or_else(|| "Anonymous".to_owned(), User::display_name),
            user_email: author.map(|u| u.email.clone()),
            product_title: self
                .product(review.product_id)
                .map(|p| p.title.clone())
                .unwrap_or_default(),
            ..review.clone()
        }
    }
}
