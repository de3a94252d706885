//! Header policy middleware.
//!
//! Wraps the whole router so every response, including ones produced by inner
//! layers (timeouts, body limits, 404/405 fallbacks), leaves with the policy
//! applied. The inner service is called exactly once per request and the
//! request itself is passed through untouched.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use tower::{Layer, Service};

use crate::security::HeaderPolicy;

/// Layer applying a [`HeaderPolicy`] to every response.
#[derive(Debug, Clone)]
pub struct HeaderPolicyLayer {
    policy: Arc<HeaderPolicy>,
}

impl HeaderPolicyLayer {
    pub fn new(policy: Arc<HeaderPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }
}

impl<S> Layer<S> for HeaderPolicyLayer {
    type Service = HeaderPolicyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeaderPolicyService {
            inner,
            policy: self.policy.clone(),
        }
    }
}

/// Service produced by [`HeaderPolicyLayer`].
#[derive(Debug, Clone)]
pub struct HeaderPolicyService<S> {
    inner: S,
    policy: Arc<HeaderPolicy>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HeaderPolicyService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let policy = self.policy.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            policy.apply(response.headers_mut());
            Ok(response)
        })
    }
}
