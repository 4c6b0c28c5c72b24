//! Emporium Core - Shared domain types.
//!
//! This crate provides the types exchanged with the store backend and
//! shared by the other Emporium components:
//! - `client` - HTTP client adapter and dashboard resource service
//! - `dashboard` - Page controllers, route table and views
//! - `cli` - Terminal front end for the admin dashboard
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O and no HTTP
//! clients. Entities are transient, page-scoped copies of server state; the
//! backend owns every business rule, so derived flags such as
//! [`Product::is_low_stock`] are trusted as delivered.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, ratings, entities and list filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
