//! Metadata store client.
//!
//! # Responsibilities
//! - Own the PostgreSQL connection pool
//! - Run the single "package by name" lookup as a cached prepared statement
//!
//! # Design Decisions
//! - Pool built once at startup and shared; handlers never close it
//! - Startup checks out one connection and prepares the statement (fail fast)
//! - No per-query timeout; failures surface as whatever the driver returns

use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, PoolError, RecyclingMethod, Runtime,
};
use thiserror::Error;
use tokio_postgres::NoTls;

use crate::config::StoreConfig;
use crate::registry::Package;

/// Lookup statement. When a name has several rows the first one returned wins.
pub const GET_PACKAGE_SQL: &str = "SELECT name, url FROM packages WHERE name = $1";

/// Errors raised by the metadata store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to build connection pool: {0}")]
    Build(#[from] deadpool_postgres::CreatePoolError),

    #[error("failed to check out connection: {0}")]
    Pool(#[from] PoolError),

    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to package metadata.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Fetch a package by exact name. `Ok(None)` when no row matches.
    async fn find_package(&self, name: &str) -> Result<Option<Package>, StoreError>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgPackageStore {
    pool: Pool,
}

impl PgPackageStore {
    /// Build the pool and verify connectivity by preparing the lookup.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(config.database_url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(config.max_connections));

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        let client = pool.get().await?;
        client.prepare_cached(GET_PACKAGE_SQL).await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Metadata store connected"
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl PackageStore for PgPackageStore {
    async fn find_package(&self, name: &str) -> Result<Option<Package>, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(GET_PACKAGE_SQL).await?;

        let rows = client.query(&statement, &[&name]).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        Ok(Some(Package {
            name: row.try_get("name")?,
            url: row.try_get("url")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pool of one connection so session-scoped temp tables stay visible.
    async fn single_connection_pool() -> Pool {
        let mut cfg = Config::new();
        cfg.url = std::env::var("DATABASE_URL").ok();
        cfg.pool = Some(PoolConfig::new(1));
        cfg.create_pool(Some(Runtime::Tokio1), NoTls).unwrap()
    }

    #[tokio::test]
    #[ignore] // Needs a PostgreSQL server at DATABASE_URL
    async fn duplicate_names_resolve_to_a_single_package() {
        let pool = single_connection_pool().await;
        {
            let client = pool.get().await.unwrap();
            client
                .batch_execute(
                    "CREATE TEMP TABLE packages (name text, url text);
                     INSERT INTO packages VALUES
                         ('jquery', 'git://github.com/jquery/jquery.git'),
                         ('jquery', 'git://github.com/jquery/jquery.git');",
                )
                .await
                .unwrap();
        }
        let store = PgPackageStore { pool };

        let package = store.find_package("jquery").await.unwrap().unwrap();
        assert_eq!(package.url, "git://github.com/jquery/jquery.git");
        assert!(store.find_package("missing").await.unwrap().is_none());
    }
}
