//! Application configuration read from environment variables.

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderName;
use tracing::warn;
use votes_service::RatingServiceConfig;
use votes_shared::types::{RatingScale, TargetRef};

use crate::errors::ConfigError;

const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";
const DEFAULT_CORS_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Where votes and target counters are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local maps; contents are lost on restart.
    Memory,
}

impl StorageBackend {
    /// Parse the backend from `STORAGE_BACKEND`.
    ///
    /// Valid values: "postgres" or "memory" (case-insensitive).
    /// Defaults to "postgres" if not set or invalid.
    fn from_env() -> Self {
        match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => Self::Postgres,
            "memory" | "in-memory" => Self::Memory,
            _ => {
                warn!("Invalid STORAGE_BACKEND, defaulting to 'postgres'");
                Self::Postgres
            }
        }
    }
}

/// Reads `name`, falling back to `default` when it is unset or does not parse.
fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!(variable = name, value = %raw, error = %e, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    /// Required when `storage` is [`StorageBackend::Postgres`].
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    /// Targets created at start-up by the memory backend.
    pub seed_targets: Vec<TargetRef>,
    pub host: IpAddr,
    pub port: u16,
    /// Header an upstream gateway uses to pass the authenticated user id.
    pub identity_header: HeaderName,
    pub cors_allowed_origins: Vec<String>,
    pub service: RatingServiceConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STORAGE_BACKEND`: "postgres" or "memory" (default: postgres)
    /// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `RUN_MIGRATIONS`: Apply embedded migrations at start-up (default: true)
    /// - `SEED_TARGETS`: Comma separated `kind:uuid` targets for the memory backend
    /// - `SERVER_HOST` / `SERVER_PORT`: Listen address (default: 0.0.0.0:8080)
    /// - `IDENTITY_HEADER`: Caller id header (default: x-user-id)
    /// - `CORS_ALLOWED_ORIGINS`: Comma separated origins (default: localhost dev servers)
    /// - `RATING_SCALE`: "tri-state" or "continuous" (default: tri-state)
    /// - `VOTE_TEXT_MAX_LEN`: Maximum comment length (default: 128)
    /// - `DUPLICATE_VOTE_RETRIES`: Retries after losing a concurrent vote (default: 1)
    ///
    /// # Returns
    ///
    /// * `Ok(AppConfig)` - Parsed configuration
    /// * `Err(ConfigError::MissingVar)` - `DATABASE_URL` is unset for the postgres backend
    /// * `Err(ConfigError::InvalidValue)` - A `SEED_TARGETS` entry does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = StorageBackend::from_env();
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let seed_targets = env::var("SEED_TARGETS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<TargetRef>()
                    .map_err(|e| ConfigError::invalid("SEED_TARGETS", format!("{entry}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let identity_header = parse_env(
            "IDENTITY_HEADER",
            HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
        );

        let cors_allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_CORS_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        };

        let defaults = RatingServiceConfig::default();
        let service = defaults
            .clone()
            .with_scale(parse_env("RATING_SCALE", RatingScale::default()))
            .with_max_text_len(parse_env("VOTE_TEXT_MAX_LEN", defaults.max_text_len))
            .with_duplicate_retries(parse_env(
                "DUPLICATE_VOTE_RETRIES",
                defaults.duplicate_retries,
            ));

        Ok(Self {
            storage,
            database_url,
            database_max_connections: parse_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            run_migrations: parse_env("RUN_MIGRATIONS", true),
            seed_targets,
            host: parse_env("SERVER_HOST", DEFAULT_SERVER_HOST),
            port: parse_env("SERVER_PORT", DEFAULT_SERVER_PORT),
            identity_header,
            cors_allowed_origins,
            service,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
