//! Domain models for the storefront.
//!
//! These types represent validated domain objects, separate from the
//! database row types in [`crate::db`]. They are what handlers serialize
//! back to clients.

pub mod account;
pub mod order;
pub mod product;

pub use account::{Account, NewAccount};
pub use order::{CartItem, NewOrder, NewOrderItem, Order, OrderItem, PendingOrder};
pub use product::{Product, ProductInput};
