use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    let bind_addr = config.bind_address();
    info!("Starting {} v{} in {:?} mode", config.app.title, config.app.version, config.environment);

    let state = AppState::connect(config).await?;
    if let Some(db) = &state.database {
        db.migrate().await.context("failed to apply migrations")?;
    }
    let database = state.database.clone();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
