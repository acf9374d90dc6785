//! Shared application state

use crate::{
    config::Config,
    index::{DocumentIndex, MemoryIndex, PgIndex},
    Error, Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Which index backend to wire up.
#[derive(Debug, Clone, Copy)]
pub enum IndexBackendKind {
    /// Persist documents in Postgres.
    Postgres,
    /// Keep documents in process memory (useful for tests).
    Memory,
}

impl IndexBackendKind {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.search.backend.as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!("unknown index backend \"{other}\""))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub backend: IndexBackendKind,
    pub run_migrations: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            backend: IndexBackendKind::Postgres,
            run_migrations: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub index: Arc<dyn DocumentIndex>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let backend = IndexBackendKind::from_config(&config)?;
        Self::new_with_options(
            config,
            AppStateOptions {
                backend,
                ..AppStateOptions::default()
            },
        )
        .await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let config = Arc::new(config);

        let index: Arc<dyn DocumentIndex> = match options.backend {
            IndexBackendKind::Postgres => {
                let pool = create_db_pool(config.as_ref()).await?;

                if options.run_migrations {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations")
                        .run(&pool)
                        .await
                        .map_err(|e| Error::Internal(format!("Migration failed: {e}")))?;
                }

                Arc::new(PgIndex::new(pool))
            }
            IndexBackendKind::Memory => {
                tracing::info!("Using in-memory index backend");
                Arc::new(MemoryIndex::new())
            }
        };

        tracing::info!(
            collections = config.collections.len(),
            "Application state initialized"
        );

        Ok(Self { config, index })
    }
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .connect(&config.database.url)
        .await?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}
