//! Dependency initialization and wiring for the votes API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use votes_repository::postgres::MIGRATOR;
use votes_repository::{
    InMemoryTargetRepository, InMemoryVoteLedger, PostgresTargetRepository, PostgresVoteLedger,
    TargetRegistry,
};
use votes_service::{RatingService, RatingServiceConfig};
use votes_shared::types::{TargetKind, TargetRef};

use crate::config::{AppConfig, StorageBackend};
use crate::errors::ConfigError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub service: Arc<RatingService>,
}

impl Dependencies {
    /// Initialize the storage backend named in `config` and build the service on top.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ConfigError)` - The database could not be reached or migrated
    pub async fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        info!(
            storage = ?config.storage,
            scale = ?config.service.scale,
            duplicate_retries = config.service.duplicate_retries,
            "Initializing dependencies"
        );

        match config.storage {
            StorageBackend::Postgres => Self::postgres(config).await,
            StorageBackend::Memory => Ok(Self::in_memory(
                config.service.clone(),
                &config.seed_targets,
            )),
        }
    }

    async fn postgres(config: &AppConfig) -> Result<Self, ConfigError> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection established");

        if config.run_migrations {
            MIGRATOR.run(&pool).await?;
            info!("Database migrations applied");
        }

        let registry = PostgresTargetRepository::all(&pool)
            .into_iter()
            .fold(TargetRegistry::new(), |registry, repository| {
                registry.with(Arc::new(repository))
            });
        let ledger = Arc::new(PostgresVoteLedger::new(pool));

        Ok(Self {
            service: Arc::new(RatingService::with_config(
                ledger,
                registry,
                config.service.clone(),
            )),
        })
    }

    /// Build a service over process-local stores, creating `seed` targets with zeroed counters.
    pub fn in_memory(config: RatingServiceConfig, seed: &[TargetRef]) -> Self {
        let registry = TargetKind::ALL
            .into_iter()
            .fold(TargetRegistry::new(), |registry, kind| {
                let repository = InMemoryTargetRepository::new(kind).with_targets(
                    seed.iter()
                        .filter(|target| target.kind == kind)
                        .map(|target| target.id),
                );
                registry.with(Arc::new(repository))
            });
        info!(seeded = seed.len(), "Using in-memory storage");

        Self {
            service: Arc::new(RatingService::with_config(
                Arc::new(InMemoryVoteLedger::new()),
                registry,
                config,
            )),
        }
    }
}
