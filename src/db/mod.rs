//! Database connection pool and migration runner.

pub mod migrations;
pub mod pool;
