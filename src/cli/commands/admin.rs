use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::{AppState, Repositories};

/// Promotes a user directly in the database. The in-memory store has nobody to promote.
pub async fn handle(config: AppConfig, user_id: &str) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config.database).await?;
    let repos = Repositories::postgres(manager.pool());
    let state = AppState::new(config, repos, None)?;

    let user = state.users.make_admin(user_id).await?;
    manager.close().await;
    info!("User {} ({}) is now an admin", user.base.id, user.email);
    Ok(())
}
