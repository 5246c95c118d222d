//! Mailfold Server — application entry point.

mod settings;

use mailfold_auth::ClientService;
use mailfold_core::MailfoldError;
use mailfold_db::repository::SurrealAppClientRepository;
use mailfold_db::{DbManager, run_migrations};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mailfold=info".parse().unwrap()),
        )
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Mailfold server failed to start");
        std::process::exit(1);
    }

    tracing::info!("Mailfold server stopped.");
}

async fn run() -> Result<(), MailfoldError> {
    tracing::info!("Starting Mailfold server...");

    let settings = Settings::from_env()?;

    let manager = DbManager::connect(&settings.db).await?;
    run_migrations(manager.client()).await?;

    let registry = SurrealAppClientRepository::new(manager.client().clone());
    let _service = ClientService::new(registry, settings.auth);

    tracing::info!("Mailfold server ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| MailfoldError::Internal(format!("shutdown signal: {e}")))?;

    tracing::info!("Shutdown signal received");
    Ok(())
}
