//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (header policy, request ID, tracing, metrics, access, limits)
//! - Bind server to listener
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GuardConfig;
use crate::http::handlers;
use crate::http::middleware::{access_control_middleware, HeaderPolicyLayer};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::observability::metrics;
use crate::security::{AccessPolicy, HeaderPolicy};

/// Application state injected into handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Render handle for `/actuator/prometheus`; `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server hosting the header policy pipeline.
pub struct HttpServer {
    router: Router,
    config: GuardConfig,
    policy: Arc<HeaderPolicy>,
}

impl HttpServer {
    /// Create a server applying the hardened header policy.
    pub fn new(config: GuardConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self::with_policy(config, Arc::new(HeaderPolicy::hardened()), metrics)
    }

    /// Create a server applying `policy`.
    pub fn with_policy(
        config: GuardConfig,
        policy: Arc<HeaderPolicy>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let access = Arc::new(AccessPolicy::new(config.access.public_paths.clone()));

        tracing::info!(
            headers = policy.len(),
            public_paths = ?access.public_paths(),
            metrics_enabled = metrics.is_some(),
            "Request pipeline wired"
        );

        let router = layered(routes(AppState { metrics }), &config, policy.clone(), access);
        Self {
            router,
            config,
            policy,
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }
}

/// Handlers without middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/actuator/health", get(handlers::health))
        .route("/actuator/prometheus", get(handlers::prometheus))
        .fallback(handlers::echo)
        .with_state(state)
}

/// Wrap `app` in the request pipeline.
///
/// Layers added later run first. The header policy is added last so it is the
/// outermost layer and sees every response, including ones produced by the
/// timeout and body limit layers.
#[allow(deprecated)]
pub fn layered(
    app: Router,
    config: &GuardConfig,
    policy: Arc<HeaderPolicy>,
    access: Arc<AccessPolicy>,
) -> Router {
    app.layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn_with_state(access, access_control_middleware))
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(set_request_id_layer())
        .layer(HeaderPolicyLayer::new(policy))
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}
