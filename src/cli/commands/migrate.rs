use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config.database).await?;
    manager.migrate().await.context("failed to apply migrations")?;
    manager.close().await;
    info!("Migrations applied");
    Ok(())
}
