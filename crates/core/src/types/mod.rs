//! Domain types for Emporium.
//!
//! This module provides type-safe wrappers for the store's entities and the
//! values the dashboard filters on.

pub mod catalog;
pub mod filter;
pub mod id;
pub mod page;
pub mod price;
pub mod rating;
pub mod stats;
pub mod user;

pub use catalog::{BulkChanges, BulkUpdateResult, Category, Product, Review};
pub use filter::{ProductSort, StockFilter};
pub use id::*;
pub use page::Page;
pub use price::{Price, PriceError};
pub use rating::{Rating, RatingError};
pub use stats::DashboardStats;
pub use user::{PromoteResult, User};
