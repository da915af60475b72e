use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, trace, warn};

use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering serve function");
    info!("Logbook application starting up");
    debug!("Database URL: {}", database_url);

    let state = initialize_app_state_with_url(database_url).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind to address {}", bind_address))?;
    info!("Logbook server running on http://{}", bind_address);
    info!("Log in at http://{}/login/", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown gracefully");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A signal that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
