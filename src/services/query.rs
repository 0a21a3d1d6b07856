//! Read-only table queries over an injected database connection.

use anyhow::{Result, bail};

use crate::services::database::traits::{QueryResult, SharedConnection, TableListError};

/// Maximum number of rows returned by a table query.
pub const ROW_LIMIT: usize = 100;

/// Quote a MySQL identifier, doubling embedded backticks.
///
/// The table name still comes straight from the client and is not checked
/// against the schema, but it cannot escape the identifier position.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `SELECT * FROM <table> LIMIT 100` with the table name quoted.
pub fn select_statement(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT {}", quote_identifier(table), ROW_LIMIT)
}

/// Table listing and bounded table reads.
#[derive(Clone)]
pub struct QueryService {
    connection: SharedConnection,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("connection", &self.connection.display_name())
            .finish()
    }
}

impl QueryService {
    /// Create a service sharing the given connection.
    pub fn new(connection: SharedConnection) -> Self {
        Self { connection }
    }

    /// List table names in database order. An empty database yields an empty
    /// vec.
    pub async fn list_tables(&self) -> Result<Vec<String>, TableListError> {
        self.connection.list_tables().await
    }

    /// Fetch at most [`ROW_LIMIT`] rows from `table`.
    ///
    /// # Errors
    ///
    /// Fails on an empty table name, or with the database error unchanged if
    /// the statement fails (unknown table, lost connection).
    pub async fn query_table(&self, table: &str) -> Result<QueryResult> {
        if table.is_empty() {
            bail!("Missing table name");
        }

        let sql = select_statement(table);
        tracing::debug!("query_table: {}", sql);
        self.connection.fetch_rows(&sql, ROW_LIMIT).await
    }

    /// Liveness probe against the database.
    pub async fn ping(&self) -> Result<()> {
        self.connection.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::traits::{DatabaseConnection, Row, Value};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Serves one table named `items` with `rows` rows and records statements.
    struct FakeConnection {
        rows: usize,
        statements: Mutex<Vec<String>>,
    }

    impl FakeConnection {
        fn new(rows: usize) -> Arc<Self> {
            Arc::new(Self {
                rows,
                statements: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DatabaseConnection for FakeConnection {
        fn display_name(&self) -> String {
            "fake".to_string()
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }

        async fn close(&self) {}

        async fn list_tables(&self) -> Result<Vec<String>, TableListError> {
            Err(TableListError::new(
                vec!["items".to_string()],
                anyhow!("lost connection"),
            ))
        }

        async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<QueryResult> {
            self.statements.lock().unwrap().push(sql.to_string());
            if sql != "SELECT * FROM `items` LIMIT 100" {
                return Err(anyhow!("Table 'test.missing' doesn't exist"));
            }

            let columns = vec!["id".to_string(), "label".to_string()];
            let rows = (0..self.rows.min(max_rows))
                .map(|i| {
                    Row::from_pairs([
                        ("id", Value::Int(i as i64)),
                        ("label", Value::from_bytes(format!("item-{i}").as_bytes())),
                    ])
                })
                .collect();
            Ok(QueryResult::new(columns, rows))
        }
    }

    #[test]
    fn test_select_statement() {
        assert_eq!(select_statement("users"), "SELECT * FROM `users` LIMIT 100");
        assert_eq!(
            select_statement("my table"),
            "SELECT * FROM `my table` LIMIT 100"
        );
    }

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        assert_eq!(quote_identifier("a`b"), "`a``b`");
        assert_eq!(
            select_statement("x` UNION SELECT 1 -- "),
            "SELECT * FROM `x`` UNION SELECT 1 -- ` LIMIT 100"
        );
    }

    #[tokio::test]
    async fn test_query_table_returns_all_rows_under_cap() {
        let service = QueryService::new(FakeConnection::new(7));

        let result = service.query_table("items").await.unwrap();
        assert_eq!(result.row_count(), 7);
        assert_eq!(result.columns, vec!["id", "label"]);
        assert!(result.rows_match_columns());
        assert_eq!(result.rows[3].get("label"), Some(&Value::Text("item-3".into())));
    }

    #[tokio::test]
    async fn test_query_table_caps_rows() {
        let service = QueryService::new(FakeConnection::new(250));

        let result = service.query_table("items").await.unwrap();
        assert_eq!(result.row_count(), ROW_LIMIT);
    }

    #[tokio::test]
    async fn test_query_table_propagates_database_error() {
        let fake = FakeConnection::new(1);
        let service = QueryService::new(fake.clone());

        let err = service.query_table("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Table 'test.missing' doesn't exist");
        assert_eq!(
            *fake.statements.lock().unwrap(),
            vec!["SELECT * FROM `missing` LIMIT 100"]
        );
    }

    #[tokio::test]
    async fn test_query_table_rejects_empty_name() {
        let fake = FakeConnection::new(1);
        let service = QueryService::new(fake.clone());

        assert!(service.query_table("").await.is_err());
        assert!(fake.statements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tables_keeps_partial_result() {
        let service = QueryService::new(FakeConnection::new(0));

        let err = service.list_tables().await.unwrap_err();
        assert_eq!(err.collected, vec!["items"]);
        assert_eq!(err.to_string(), "lost connection");
    }
}
