//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. Per-route gates: [`require_auth`], then [`require_role`]

pub mod auth;
pub mod request_id;

pub use auth::{AuthContext, CurrentAccount, require_auth, require_role};
pub use request_id::request_id_middleware;
