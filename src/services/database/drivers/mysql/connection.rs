//! MySQL connection implementation.
//!
//! This module implements the `DatabaseConnection` trait for MySQL
//! using SQLx's MySqlPool.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Executor, MySqlPool, Statement};
use std::time::Duration;

use super::types::MySqlValueConverter;
use crate::config::DbConfig;
use crate::services::database::traits::{
    DatabaseConnection, QueryResult, Row, TableListError,
};

/// Maximum number of pooled connections.
const MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a free pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// MySQL database connection.
///
/// This struct wraps a SQLx MySqlPool and implements the `DatabaseConnection` trait.
pub struct MySqlConnection {
    display_name: String,
    pool: MySqlPool,
}

impl std::fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("display_name", &self.display_name)
            .field("pool", &"<MySqlPool>")
            .finish()
    }
}

impl MySqlConnection {
    /// Open a pool from configuration and verify it with a ping.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached, the credentials are
    /// rejected, or the initial ping fails. The service must not start in
    /// that case.
    pub async fn open(config: &DbConfig) -> Result<Self> {
        let options = Self::build_connect_options(config);

        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", config.display_name()))?;

        let connection = Self::from_pool(pool, config.display_name());
        connection
            .ping()
            .await
            .context("Initial database ping failed")?;

        tracing::info!("Connected to MySQL at {}", connection.display_name);
        Ok(connection)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool, display_name: String) -> Self {
        Self { display_name, pool }
    }

    /// Build MySqlConnectOptions from the configuration.
    pub(crate) fn build_connect_options(config: &DbConfig) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&config.hostname)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(MySqlValueConverter::map_ssl_mode(config.ssl_mode))
    }

    /// Get a reference to the pool (internal helper for schema module).
    pub(crate) fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseConnection for MySqlConnection {
    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!("Closed MySQL pool for {}", self.display_name);
        }
    }

    async fn list_tables(&self) -> Result<Vec<String>, TableListError> {
        self.fetch_table_names().await
    }

    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<QueryResult> {
        let mut columns: Option<Vec<String>> = None;
        let mut rows: Vec<Row> = Vec::new();

        {
            let mut stream = sqlx::query(sql).fetch(&self.pool);
            while rows.len() < max_rows {
                let Some(mysql_row) = stream.try_next().await? else {
                    break;
                };
                if columns.is_none() {
                    columns = Some(MySqlValueConverter::column_names(
                        sqlx::Row::columns(&mysql_row),
                    ));
                }
                rows.push(MySqlValueConverter::convert_row(&mysql_row));
            }
        }

        let columns = match columns {
            Some(columns) => columns,
            // No rows: ask the server for the result shape instead
            None => {
                let statement = (&self.pool).prepare(sql).await?;
                MySqlValueConverter::column_names(statement.columns())
            }
        };

        Ok(QueryResult::new(columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> DbConfig {
        DbConfig::new(
            "db.internal".to_string(),
            3307,
            "reporter".to_string(),
            "password".to_string(),
            "reports".to_string(),
        )
    }

    #[test]
    fn test_build_connect_options() {
        let options = MySqlConnection::build_connect_options(&create_test_config());

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "reporter");
        assert_eq!(options.get_database(), Some("reports"));
    }

    #[tokio::test]
    async fn test_open_unreachable_server_fails() {
        let config = DbConfig::new(
            "127.0.0.1".to_string(),
            1,
            "nobody".to_string(),
            String::new(),
            "nothing".to_string(),
        );

        let err = MySqlConnection::open(&config).await.unwrap_err();
        assert!(err.to_string().contains("nobody@127.0.0.1:1/nothing"));
    }
}
