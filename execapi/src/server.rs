//! HTTP server wiring
//!
//! Registers the execution, health and fallback handlers and runs the
//! listener until a shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::handlers;

/// Build the router for a validated configuration
///
/// Request bodies are read whole with no size cap.
pub fn router(config: &Config) -> Router {
    let router = Router::new()
        .route(&config.route, get(handlers::exec).post(handlers::exec))
        .route(&config.health, any(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable());

    for path in ["/", config.health.as_str(), config.route.as_str()] {
        tracing::info!("registered on {} path {}", config.addr, path);
    }

    router
}

/// Serve until `shutdown` resolves, then drain in-flight requests
///
/// In-flight requests keep their child processes; draining waits for them.
pub async fn serve<F>(listener: TcpListener, config: &Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(config);

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
