//! Route handlers for the table browsing API.

use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;

use super::error::ApiError;
use crate::services::QueryService;
use crate::services::database::traits::Row;

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// Query string key naming the table to read.
const TABLE_PARAM: &str = "table";

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub status: &'static str,
    pub tables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub status: &'static str,
    pub data: Vec<Row>,
}

/// Body of the connection probe. `message` is only set on failure.
#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/query/tables`
pub async fn list_tables(
    State(service): State<QueryService>,
) -> Result<Json<TablesResponse>, ApiError> {
    let tables = service
        .list_tables()
        .await
        .map_err(|e| ApiError::ListTables(e.to_string()))?;

    Ok(Json(TablesResponse {
        status: STATUS_SUCCESS,
        tables,
    }))
}

/// `GET /api/query?table=<name>`
///
/// When `table` is repeated the first occurrence wins.
pub async fn query_table(
    State(service): State<QueryService>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<DataResponse>, ApiError> {
    let table = params
        .into_iter()
        .find(|(key, _)| key == TABLE_PARAM)
        .map(|(_, value)| value)
        .filter(|table| !table.is_empty())
        .ok_or(ApiError::MissingTable)?;

    let result = service
        .query_table(&table)
        .await
        .map_err(|e| ApiError::QueryTable(e.to_string()))?;

    Ok(Json(DataResponse {
        status: STATUS_SUCCESS,
        data: result.rows,
    }))
}

/// `GET /api/db/test-connection`
///
/// Always answers 200; a failed ping is reported in the body so clients can
/// tell "service up, database down" from "service down".
pub async fn test_connection(State(service): State<QueryService>) -> Json<ConnectionStatus> {
    match service.ping().await {
        Ok(()) => Json(ConnectionStatus {
            status: STATUS_SUCCESS,
            message: None,
        }),
        Err(e) => Json(ConnectionStatus {
            status: STATUS_ERROR,
            message: Some(e.to_string()),
        }),
    }
}
