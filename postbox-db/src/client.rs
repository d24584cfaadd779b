use crate::unit_of_work::UnitOfWork;
use postbox_common::model::{EntityKey, ModelValidationError};
use serde::Deserialize;
use sqlx::{
    SqlitePool,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("The {0} was not found")]
    NotFound(EntityKey),
    #[error("Inserting {0} failed")]
    InsertFailure(EntityKey, #[source] Option<sqlx::Error>),
    #[error("Deleting {0} failed")]
    DeleteFailure(EntityKey, #[source] Option<sqlx::Error>),
    #[error("Updating {0} failed")]
    UpdateFailure(EntityKey, #[source] Option<sqlx::Error>),
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct DbConfig {
    #[serde(default = "DbConfig::default_url")]
    pub url: String,
    #[serde(default = "DbConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DbConfig {
    pub const MEMORY_URL: &'static str = "sqlite::memory:";

    fn default_url() -> String {
        "sqlite://postbox.db".to_owned()
    }

    fn default_max_connections() -> u32 {
        5
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: Self::MEMORY_URL.to_owned(),
            max_connections: 1,
        }
    }

    /// Every connection to an in-memory database opens a new, empty database.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url == Self::MEMORY_URL
            || self.url == "sqlite://memory:"
            || self.url.contains("mode=memory")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

/// Shared handle to the store. Cloning is cheap; every clone uses the same pool.
#[derive(Clone, Debug)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(connect_options).await?;
        info!(url = %config.url, "Connected to database");

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Database migrations applied");

        Ok(())
    }

    /// Begins a transaction scoped to the returned unit of work.
    pub async fn unit_of_work(&self) -> Result<UnitOfWork> {
        UnitOfWork::begin(&self.pool).await
    }
}
