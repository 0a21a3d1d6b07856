//! Read-only HTTP access to the tables of a MySQL database.
//!
//! - [`config`]: `DB_*` environment configuration
//! - [`services`]: connection pool, row model, and table queries
//! - [`api`]: the three JSON routes
//! - [`server`]: middleware, listener, self-check, and graceful shutdown

pub mod api;
pub mod config;
pub mod server;
pub mod services;
