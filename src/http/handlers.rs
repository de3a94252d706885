//! Request handlers.
//!
//! - `GET /actuator/health` reports liveness
//! - `GET /actuator/prometheus` renders the metrics registry
//! - everything else is echoed back (method, path, request id) with 200

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::http::request::request_id;
use crate::http::server::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

pub async fn prometheus(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn echo(method: Method, uri: Uri, headers: HeaderMap) -> Json<Value> {
    let request_id = request_id(&headers);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Echoing request"
    );

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "request_id": request_id,
    }))
}
