//! HTTP routes over the query service.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /api/query/tables` | [`handlers::list_tables`] |
//! | `GET /api/query?table=<name>` | [`handlers::query_table`] |
//! | `GET /api/db/test-connection` | [`handlers::test_connection`] |

use axum::Router;
use axum::routing::get;

use crate::services::QueryService;

mod error;
pub mod handlers;

pub use error::ApiError;

pub const TABLES_PATH: &str = "/api/query/tables";
pub const QUERY_PATH: &str = "/api/query";
pub const TEST_CONNECTION_PATH: &str = "/api/db/test-connection";

pub fn create_api_router(service: QueryService) -> Router {
    Router::new()
        .route(TABLES_PATH, get(handlers::list_tables))
        .route(QUERY_PATH, get(handlers::query_table))
        .route(TEST_CONNECTION_PATH, get(handlers::test_connection))
        .with_state(service)
}
