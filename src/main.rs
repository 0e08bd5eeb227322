use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use languhelp_api::cli::{self, Cli};
use languhelp_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so APP_* variables are picked up locally
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
