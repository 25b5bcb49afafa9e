//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - accounts, password login, access tokens, promotion
//! - `orders` - transactional order placement and order listings
//!
//! Services borrow a store for the duration of one operation and are
//! generic over the store trait they need, so handlers pass
//! `state.store()` and tests pass a `MemoryStore` or a failing wrapper.

pub mod auth;
pub mod orders;

pub use auth::{AccountService, AuthError, TokenError, TokenService};
pub use orders::{OrderError, OrderService};
