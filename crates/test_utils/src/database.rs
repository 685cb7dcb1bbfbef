//! Database Test Utilities
//!
//! Starts a throwaway PostgreSQL container per test and provisions the ledger
//! schema through the real provisioner, so the migrations are exercised by
//! every integration test.

use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use ledger_db::{create_pool, DatabaseConfig, PostgresLedger, ProvisionTarget, SchemaProvisioner};

const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "ledger_test";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A PostgreSQL test container with the ledger schema applied
///
/// The container is stopped when this value is dropped.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container and provisions the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or the schema fails
    /// to provision
    pub async fn new() -> Result<Self, BoxError> {
        let container = Postgres::default()
            .with_user(POSTGRES_USER)
            .with_password(POSTGRES_PASSWORD)
            .with_db_name(POSTGRES_DB)
            .with_tag(POSTGRES_TAG)
            .start()
            .await?;

        let config = TestDatabaseConfig {
            host: container.get_host().await?.to_string(),
            port: container.get_host_port_ipv4(5432).await?,
            ..TestDatabaseConfig::default()
        };

        let pool = create_pool(
            DatabaseConfig::new(config.connection_url())
                .max_connections(5)
                .min_connections(0),
        )
        .await?;

        SchemaProvisioner::new(pool.clone())
            .provision(ProvisionTarget::Latest)
            .await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns a ledger adapter over this database
    pub fn ledger(&self) -> PostgresLedger {
        PostgresLedger::new(self.pool.clone())
    }

    /// Clears all ledger data while preserving the schema
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::query("TRUNCATE TABLE entries, transactions, accounts CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Helper macro for running database tests against a fresh container
///
/// The body sees `db: TestDatabase` and `ledger: PostgresLedger`. Tests are
/// ignored by default because they need a Docker daemon.
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident, $ledger:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires a Docker daemon for testcontainers"]
        async fn $name() {
            #[allow(unused_variables)]
            let $db = $crate::database::TestDatabase::new()
                .await
                .expect("Failed to create test database");
            #[allow(unused_variables)]
            let $ledger = $db.ledger();
            $body
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.ends_with(POSTGRES_DB));
    }
}
