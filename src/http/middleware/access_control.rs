//! Access Control Middleware.
//! Evaluates the access rules and always forwards the request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::security::{AccessDecision, AccessPolicy};

pub async fn access_control_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    match policy.authorize(req.uri().path()) {
        AccessDecision::Permit(rule) => {
            tracing::debug!(
                method = %req.method(),
                path = %req.uri().path(),
                rule = %rule,
                "Request permitted"
            );
            next.run(req).await
        }
    }
}
