//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics recorder when enabled
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last so traffic only arrives once the pipeline is wired

use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use tokio::net::TcpListener;

use crate::config::GuardConfig;
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] BuildError),
}

/// Install the global Prometheus recorder if metrics are enabled.
pub fn install_metrics(config: &GuardConfig) -> Result<Option<PrometheusHandle>, StartupError> {
    if !config.observability.metrics_enabled {
        tracing::info!("Metrics disabled");
        return Ok(None);
    }

    let handle = metrics::install_recorder()?;
    tracing::info!("Metrics recorder installed");
    Ok(Some(handle))
}

pub async fn bind_listener(config: &GuardConfig) -> Result<TcpListener, StartupError> {
    let address = &config.listener.bind_address;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Listening for connections");
    }
    Ok(listener)
}
