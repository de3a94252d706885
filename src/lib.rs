//! Security header middleware and server.
//!
//! Every response leaves with a fixed header policy applied (HSTS, nosniff,
//! frame denial, referrer and cross-origin policies, no-cache headers, no
//! `Server` header). Every request is permitted; no CSRF validation happens.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ HeaderPolicyLayer ─▶ request id ─▶ trace ─▶ metrics
//!                          │                                        │
//!                          │            access control (permit) ◀───┘
//!                          │                     │
//!                          │            timeout / body limit
//!                          │                     │
//!     Client Response      ▼                     ▼
//!     ◀────────────── apply policy ◀──────── handlers
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GuardConfig;
pub use http::{HeaderPolicyLayer, HttpServer};
pub use lifecycle::Shutdown;
pub use security::{AccessPolicy, HeaderPolicy};
