//! header-guard server.
//!
//! Loads configuration, wires the header policy pipeline in front of the
//! actuator endpoints and the echo handler, and serves until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use header_guard::config::{load_config, validate_config, ConfigError, GuardConfig};
use header_guard::lifecycle::{signals, startup, Shutdown};
use header_guard::observability::logging;
use header_guard::HttpServer;

#[derive(Parser)]
#[command(name = "header-guard")]
#[command(about = "HTTP server applying a fixed security header policy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability)?;

    tracing::info!("header-guard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = ?cli.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    let metrics = startup::install_metrics(&config)?;
    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, metrics);
    let listener = startup::bind_listener(server.config()).await?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::wait_for_termination() => {}
    }

    shutdown.trigger();
    match tokio::time::timeout(grace, server_task).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            grace_secs = grace.as_secs(),
            "In-flight requests did not drain in time, exiting"
        ),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
