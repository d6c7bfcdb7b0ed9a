use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ConfigError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            name,
            value: value.into(),
        }
    }
}
