//! Emporium Client - HTTP access to the store backend.
//!
//! Every request from the dashboard goes through one adapter, which:
//! - resolves the request URL against an injected [`ApiOrigin`]
//! - attaches `Authorization: Bearer <token>` from the injected [`Session`]
//!   unless the path is public
//! - adds the tunnel bypass header when the origin is a tunnel
//! - logs failed responses and hands them back unchanged
//!
//! [`DashboardApi`] layers one typed function per backend operation on top
//! of the adapter.
//!
//! # Example
//!
//! ```rust,no_run
//! use emporium_client::{ApiClient, ApiOrigin, DashboardApi, ListOptions, Session};
//!
//! # async fn run() -> Result<(), emporium_client::ApiError> {
//! let session = Session::with_token("token-from-login");
//! let client = ApiClient::new(ApiOrigin::local(), session)?;
//! let api = DashboardApi::new(client);
//!
//! let options = ListOptions::new().set("search", "jam").set("stock", "");
//! let page = api.products(&options).await?.data;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapter;
pub mod config;
pub mod dashboard;
pub mod endpoint;
pub mod error;
pub mod form;
pub mod query;
pub mod session;

pub use adapter::{ApiClient, ApiResponse, Body, PUBLIC_PATHS, TUNNEL_BYPASS_HEADER, is_public_path};
pub use config::{ClientConfig, ConfigError};
pub use dashboard::DashboardApi;
pub use endpoint::{ApiOrigin, EndpointError};
pub use error::{ApiError, ErrorKind};
pub use form::{CategoryDraft, ImageUpload, ProductDraft};
pub use query::ListOptions;
pub use reqwest::StatusCode;
pub use session::{Session, SessionError, SessionStore, SessionUser};
