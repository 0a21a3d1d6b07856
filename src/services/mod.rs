pub mod database;
pub mod query;

pub use query::QueryService;
