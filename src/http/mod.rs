//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer ordering)
//!     → middleware/security_headers.rs (outermost; applies HeaderPolicy on the way out)
//!     → request.rs (assign / propagate request ID)
//!     → middleware/access_control.rs (permit-all rule evaluation)
//!     → handlers.rs (actuator endpoints, echo fallback)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{HeaderPolicyLayer, HeaderPolicyService};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
