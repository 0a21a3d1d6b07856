//! Database driver implementations.
//!
//! - **MySQL**: MySQL/MariaDB support via SQLx
//!
//! Each driver implements the `DatabaseConnection` trait.

pub mod mysql;
