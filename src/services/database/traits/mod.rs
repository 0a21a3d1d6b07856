//! Database abstraction traits and types.
//!
//! - **Row/Value** (`row`): dynamically-typed values, ordered rows, query results
//! - **Connection** (`connection`): the read-only connection trait the query
//!   service depends on

mod connection;
mod row;

pub use connection::{DatabaseConnection, SharedConnection, TableListError};
pub use row::{Cell, QueryResult, Row, Value};
