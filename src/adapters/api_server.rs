use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::error::Result;
use crate::services::SourceGateway;

/// Start the API server and serve until Ctrl-C / SIGTERM
pub async fn start_api_server(gateway: SourceGateway, config: AppConfig, port: u16) -> Result<()> {
    let app_state = AppState::new(gateway, config);
    let app = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 API server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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
    info!("Shutdown signal received");
}
