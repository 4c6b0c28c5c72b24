//! Emporium Dashboard - page controllers for the store admin.
//!
//! Each dashboard screen is a controller that holds its filters and a
//! [`Loadable`](controller::Loadable) for its data, calls
//! [`DashboardApi`](emporium_client::DashboardApi), and renders itself to
//! text through askama templates.
//!
//! # Modules
//!
//! - [`controller`]: load states, request tickets, notices
//! - [`confirm`]: prompts guarding destructive actions
//! - [`pages`]: overview, products, categories, reviews and users
//! - [`routes`]: route table with login and admin guards

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod confirm;
pub mod controller;
pub mod pages;
pub mod routes;

pub use confirm::{AlwaysConfirm, Confirm, NeverConfirm};
pub use controller::{
    DisplayError, LoadState, Loadable, NOTICE_TTL, Notice, Outcome, Sequencing, Settled, Ticket,
};
pub use routes::{Guard, Page, Resolution, Route, RouteTable, Viewer};
