//! MySQL database driver implementation.
//!
//! This module provides a MySQL driver that implements the `DatabaseConnection`
//! trait using SQLx.
//!
//! # Example
//!
//! ```ignore
//! use report_viewer::config::DbConfig;
//! use report_viewer::services::database::drivers::mysql::MySqlConnection;
//!
//! let config = DbConfig::from_env()?;
//! let conn = MySqlConnection::open(&config).await?;
//! ```

mod connection;
mod schema;
mod types;

pub use connection::MySqlConnection;
pub use types::MySqlValueConverter;
