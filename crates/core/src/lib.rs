//! OnlineShop Core - Shared domain types.
//!
//! This crate provides the types shared by every OnlineShop component:
//! - `storefront` - HTTP API (catalog, accounts, orders)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices, roles and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
