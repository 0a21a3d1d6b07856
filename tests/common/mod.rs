#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use report_viewer::services::database::traits::{
    DatabaseConnection, QueryResult, Row, TableListError, Value,
};
use report_viewer::services::query::select_statement;

/// In-memory stand-in for a MySQL pool.
#[derive(Default)]
pub struct FakeConnection {
    tables: Vec<(String, QueryResult)>,
    ping_error: Option<String>,
    list_error: Option<String>,
    query_delay: Option<Duration>,
    closed: AtomicBool,
    statements: Mutex<Vec<String>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.tables
            .push((name.to_string(), QueryResult::new(columns, rows)));
        self
    }

    /// A table `name` with columns `id, label` and `count` rows.
    pub fn with_numbered_table(self, name: &str, count: usize) -> Self {
        let rows = (0..count)
            .map(|i| {
                Row::from_pairs([
                    ("id", Value::Int(i as i64)),
                    ("label", Value::Text(format!("row-{i}"))),
                ])
            })
            .collect();
        self.with_table(name, &["id", "label"], rows)
    }

    pub fn with_ping_error(mut self, message: &str) -> Self {
        self.ping_error = Some(message.to_string());
        self
    }

    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseConnection for FakeConnection {
    fn display_name(&self) -> String {
        "fake@localhost:3306/test".to_string()
    }

    async fn ping(&self) -> Result<()> {
        if self.is_closed() {
            return Err(anyhow!("attempted to acquire a connection on a closed pool"));
        }
        match &self.ping_error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    async fn list_tables(&self) -> Result<Vec<String>, TableListError> {
        let names: Vec<String> = self.tables.iter().map(|(name, _)| name.clone()).collect();
        match &self.list_error {
            Some(message) => Err(TableListError::new(names, anyhow!(message.clone()))),
            None => Ok(names),
        }
    }

    async fn fetch_rows(&self, sql: &str, max_rows: usize) -> Result<QueryResult> {
        self.statements.lock().unwrap().push(sql.to_string());
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }

        let statements: HashMap<String, &QueryResult> = self
            .tables
            .iter()
            .map(|(name, result)| (select_statement(name), result))
            .collect();

        match statements.get(sql) {
            Some(result) => {
                let rows = result.rows.iter().take(max_rows).cloned().collect();
                Ok(QueryResult::new(result.columns.clone(), rows))
            }
            None => Err(anyhow!(
                "error returned from database: 1146 (42S02): Table doesn't exist"
            )),
        }
    }
}
