//! Core database connection trait.
//!
//! This module defines the `DatabaseConnection` trait that the query service
//! talks to, and the error returned when a table listing stops part-way.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use super::row::QueryResult;

/// A table listing that failed after collecting some (possibly zero) names.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct TableListError {
    /// Table names read before the failure, in database order
    pub collected: Vec<String>,
    /// The underlying query or scan error
    pub error: anyhow::Error,
}

impl TableListError {
    /// Wrap an error together with the names collected so far
    pub fn new(collected: Vec<String>, error: impl Into<anyhow::Error>) -> Self {
        Self {
            collected,
            error: error.into(),
        }
    }
}

/// Read-only operations against a pooled database connection.
///
/// Implementations own their pool and are shared as
/// `Arc<dyn DatabaseConnection>` for the lifetime of the process.
///
/// # Example
///
/// ```ignore
/// use report_viewer::services::database::traits::DatabaseConnection;
///
/// async fn example(conn: &dyn DatabaseConnection) -> anyhow::Result<()> {
///     conn.ping().await?;
///     let result = conn.fetch_rows("SELECT 1", 1).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Human-readable description, typically `user@host:port/database`.
    fn display_name(&self) -> String;

    /// Lightweight round-trip confirming the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Release all pooled connections. Calling it again is a no-op.
    async fn close(&self);

    /// List table names in the current database, in database order.
    ///
    /// # Errors
    ///
    /// Stops at the first query or scan error and returns the names read so
    /// far alongside it.
    async fn list_tables(&self) -> Result<Vec<String>, TableListError>;

    /// Run a read-only statement and collect at most `max_rows` rows.
    ///
    /// Column names are reported even when no rows come back.
    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<QueryResult>;
}

/// A shared database connection trait object.
pub type SharedConnection = std::sync::Arc<dyn DatabaseConnection>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_table_list_error_keeps_partial_names() {
        let err = TableListError::new(
            vec!["a".to_string(), "b".to_string()],
            anyhow!("connection reset"),
        );

        assert_eq!(err.collected, vec!["a", "b"]);
        assert_eq!(err.to_string(), "connection reset");

        let wrapped = anyhow::Error::new(err);
        assert_eq!(format!("{:#}", wrapped), "connection reset");
    }
}
