//! MySQL schema introspection.

use futures::TryStreamExt;

use super::connection::MySqlConnection;
use super::types::MySqlValueConverter;
use crate::services::database::traits::TableListError;

/// Introspection query returning one table name per row.
pub(crate) const LIST_TABLES_SQL: &str = "SHOW TABLES";

impl MySqlConnection {
    /// Stream `SHOW TABLES`, keeping every name read before a failure.
    pub(crate) async fn fetch_table_names(&self) -> Result<Vec<String>, TableListError> {
        let mut tables = Vec::new();
        let mut stream = sqlx::query(LIST_TABLES_SQL).fetch(self.pool());

        loop {
            match stream.try_next().await {
                Ok(Some(row)) => match MySqlValueConverter::text_at(&row, 0) {
                    Ok(name) => tables.push(name),
                    Err(e) => return Err(TableListError::new(tables, e)),
                },
                Ok(None) => return Ok(tables),
                Err(e) => return Err(TableListError::new(tables, e)),
            }
        }
    }
}
