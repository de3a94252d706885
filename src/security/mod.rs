//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_control.rs (evaluate rules; always permits)
//!     → handler
//! Outgoing response:
//!     → headers.rs (overwrite policy headers, strip Server)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Both policies are built at startup and shared read-only
//! - Nothing here can fail per request; bad policies are rejected at wiring time
//! - No CSRF validation

pub mod access_control;
pub mod headers;

pub use access_control::{AccessDecision, AccessPolicy, MatchedRule};
pub use headers::{HeaderPolicy, HeaderRule, PolicyError, Violation};
