//! OnlineShop storefront library.
//!
//! The HTTP API, authentication gates, order transaction logic and data
//! access layer, exposed as a library so the binary, the CLI and the
//! integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use app::build_router;
