pub mod drivers;
pub mod traits;

pub use drivers::mysql::MySqlConnection;
pub use traits::{DatabaseConnection, QueryResult, Row, SharedConnection, TableListError, Value};
