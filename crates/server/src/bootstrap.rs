use std::sync::Arc;

use clientele_core::config::{AppConfig, ConfigError, LoadOptions};
use clientele_db::repositories::{CustomerRepository, SqlCustomerRepository};
use clientele_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

/// Everything handlers need, constructed once at process startup. The
/// customer store handle is created here and passed down; no module-level
/// registration.
pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub customers: Arc<dyn CustomerRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let customers: Arc<dyn CustomerRepository> =
        Arc::new(SqlCustomerRepository::new(db_pool.clone()));

    Ok(Application { config, db_pool, customers })
}
