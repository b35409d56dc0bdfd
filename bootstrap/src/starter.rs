//! Service starter
//!
//! Unified entry point for HTTP service binaries:
//! 1. load config
//! 2. initialize runtime (logging, metrics)
//! 3. build infrastructure resources (with retry)
//! 4. call the service closure to build the axum router
//! 5. serve with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use obra_config::AppConfig;
use tracing::info;

use crate::infrastructure::Infrastructure;
use crate::runtime::{init_runtime, shutdown_signal};

/// Run an HTTP service.
///
/// ```ignore
/// use obra_bootstrap::run_server;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_server("config", |infra, metrics| async move {
///         build_router(infra, metrics)
///     })
///     .await
/// }
/// ```
pub async fn run_server<F, Fut>(
    config_dir: &str,
    router_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Arc<Infrastructure>, PrometheusHandle) -> Fut,
    Fut: Future<Output = Router>,
{
    // .env is optional; real deployments use the environment directly
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(config_dir)?;

    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics_handle = obra_telemetry::init_metrics();

    let infra = Arc::new(Infrastructure::from_config(config.clone()).await?);

    let app = router_builder(infra, metrics_handle).await;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
